// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Build-time path arithmetic
//!
//! Paths are handled as strings with either separator and always produced
//! with `/`, independent of the host platform, so that emitted literals do
//! not change between build machines. Nothing here touches the file system
//! or the current working directory.

/// Replace every `\` with `/`
pub fn to_slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Does the path start with a drive letter (`C:`)?
pub fn is_drive_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// path.isAbsolute(path), for both POSIX and drive-letter paths
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with('\\') || is_drive_absolute(path)
}

/// Split an absolute path into its root (`/`, `C:/`) and the rest
fn split_root(path: &str) -> (String, &str) {
    if is_drive_absolute(path) {
        (format!("{}/", &path[..2]), &path[2..])
    } else if path.starts_with('/') || path.starts_with('\\') {
        ("/".to_string(), path)
    } else {
        (String::new(), path)
    }
}

fn components(path: &str) -> Vec<&str> {
    let mut components: Vec<&str> = Vec::new();
    let is_absolute = is_absolute(path);

    for component in path.split(['/', '\\']) {
        match component {
            "" | "." => continue,
            ".." => {
                if !components.is_empty() && components.last() != Some(&"..") {
                    components.pop();
                } else if !is_absolute {
                    components.push("..");
                }
            }
            c => components.push(c),
        }
    }

    components
}

/// path.normalize(path), with `/` separators
pub fn normalize(path: &str) -> String {
    let (root, rest) = split_root(path);
    let result = components(rest).join("/");

    if !root.is_empty() {
        format!("{}{}", root, result)
    } else if result.is_empty() {
        ".".to_string()
    } else {
        result
    }
}

/// path.join(...paths)
pub fn join(paths: &[&str]) -> String {
    let mut result = String::new();
    for p in paths {
        if is_absolute(p) || result.is_empty() {
            result = p.to_string();
        } else if !p.is_empty() {
            result.push('/');
            result.push_str(p);
        }
    }
    normalize(&result)
}

/// path.dirname(path)
pub fn dirname(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(index) => {
            let (root, _) = split_root(&normalized);
            if index < root.len() {
                root
            } else {
                normalized[..index].to_string()
            }
        }
        None => ".".to_string(),
    }
}

/// path.relative(from, to)
///
/// Returns the empty string when both paths are equal. When the paths live
/// under different roots (two drive letters) there is no relative path and
/// the normalized `to` is returned, which is absolute.
pub fn relative(from: &str, to: &str) -> String {
    let (from_root, from_rest) = split_root(from);
    let (to_root, to_rest) = split_root(to);

    if !from_root.eq_ignore_ascii_case(&to_root) {
        return normalize(to);
    }

    let from_components = components(from_rest);
    let to_components = components(to_rest);

    // Find common prefix
    let common_len = from_components
        .iter()
        .zip(to_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result: Vec<&str> = Vec::new();

    // Add ".." for each remaining component in "from"
    for _ in common_len..from_components.len() {
        result.push("..");
    }

    // Add remaining components from "to"
    result.extend(to_components.iter().skip(common_len));

    result.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(r"src\lib\a.js"), "src/lib/a.js");
    }

    #[test]
    fn test_is_drive_absolute() {
        assert!(is_drive_absolute("C:/project"));
        assert!(is_drive_absolute(r"d:\project"));
        assert!(!is_drive_absolute("/project"));
        assert!(!is_drive_absolute("./C:"));
    }

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("/foo/bar"));
        assert!(is_absolute(r"C:\foo"));
        assert!(!is_absolute("foo/bar"));
        assert!(!is_absolute("./foo"));
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["foo", "bar", "baz"]), "foo/bar/baz");
        assert_eq!(join(&["/foo", "bar", "baz"]), "/foo/bar/baz");
        assert_eq!(join(&["foo", "../bar"]), "bar");
        assert_eq!(join(&["/opt/spacey/lib", "..", "buildin", "module.js"]), "/opt/spacey/buildin/module.js");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/foo/bar//baz/asdf/quux/.."), "/foo/bar/baz/asdf");
        assert_eq!(normalize("foo/bar/../baz"), "foo/baz");
        assert_eq!(normalize(r"C:\foo\..\bar"), "C:/bar");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize("./"), ".");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/foo/bar/baz.txt"), "/foo/bar");
        assert_eq!(dirname("/foo"), "/");
        assert_eq!(dirname(r"C:\foo\a.js"), "C:/foo");
        assert_eq!(dirname("C:/a.js"), "C:/");
        assert_eq!(dirname("foo"), ".");
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative("/project", "/project/src/a.js"), "src/a.js");
        assert_eq!(relative("/project/src", "/project/lib/x.js"), "../lib/x.js");
        assert_eq!(relative("/project", "/project"), "");
        assert_eq!(relative("/project/src/deep", "/project"), "../..");
    }

    #[test]
    fn test_relative_mixed_separators() {
        assert_eq!(relative(r"C:\project", r"C:\project\src\a.js"), "src/a.js");
        assert_eq!(relative(r"c:\project", "C:/project/src"), "src");
    }

    #[test]
    fn test_relative_across_drives_is_absolute() {
        assert_eq!(relative(r"C:\project\src", r"D:\tools\module.js"), "D:/tools/module.js");
    }
}
