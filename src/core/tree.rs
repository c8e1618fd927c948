//! Structure tree rendering
//!
//! Draws only the ancestry of the selected files, directories first, each
//! group alphabetical:
//!
//! ```text
//! project/
//! ├── src/
//! │   ├── core/
//! │   │   └── mod.rs
//! │   └── main.rs
//! └── README.md
//! ```

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct DirNode {
    dirs: BTreeMap<String, DirNode>,
    files: BTreeSet<String>,
}

impl DirNode {
    fn insert(&mut self, relative: &str) {
        let mut node = self;
        let mut parts = relative.split('/').filter(|p| !p.is_empty()).peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                node.files.insert(part.to_string());
            } else {
                node = node.dirs.entry(part.to_string()).or_default();
            }
        }
    }

    fn render(&self, prefix: &str, out: &mut String) {
        let total = self.dirs.len() + self.files.len();
        let mut index = 0;

        for (name, child) in &self.dirs {
            index += 1;
            let last = index == total;
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(name);
            out.push_str("/\n");

            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            child.render(&child_prefix, out);
        }

        for name in &self.files {
            index += 1;
            out.push_str(prefix);
            out.push_str(if index == total { "└── " } else { "├── " });
            out.push_str(name);
            out.push('\n');
        }
    }
}

/// Render the selected relative paths as a tree under `root_label`.
///
/// Input order does not matter. Output ends with a newline.
pub fn render_tree<I, S>(root_label: &str, paths: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut root = DirNode::default();
    for path in paths {
        root.insert(path.as_ref());
    }

    let mut out = format!("{}/\n", root_label.trim_end_matches('/'));
    root.render("", &mut out);
    out
}
