mod greeting;

fn main() {
    println!("{}", greeting::hello("sample"));
}
