//! Hand the finished program text to its consumer: a file or stdout.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub fn emit(output: &str, path: Option<&Path>) -> io::Result<()> {
    match path {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, output)
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_file() {
        let dir = std::env::temp_dir().join(format!("gostc-js-{}", std::process::id()));
        let path = dir.join("nested").join("out.js");

        emit("const m_М = 1;\n", Some(path.as_path())).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "const m_М = 1;\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
