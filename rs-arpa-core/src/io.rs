use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Normalize a folder path.
///
/// - `""`, `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder<P: AsRef<Path>>(input: P) -> PathBuf {
	let input = input.as_ref();
	if input.as_os_str().is_empty() || input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}

/// Builds the path of an output file inside `folder`.
///
/// Example:
/// `out/` + `"lm.txt"` → `out/lm.txt`
///
/// # Errors
/// Returns `InvalidInput` if `folder` exists but is not a directory.
pub(crate) fn build_output_path<P: AsRef<Path>>(folder: P, filename: &str) -> io::Result<PathBuf> {
	let folder = normalize_folder(folder);
	if folder.exists() && !folder.is_dir() {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("Expected a directory, got: {}", folder.display()),
		));
	}
	Ok(folder.join(filename))
}

/// Writes `contents` to `path`, creating missing parent directories.
///
/// The text is written through a sibling temporary file and renamed into
/// place, so a failed write never leaves a truncated model behind.
pub(crate) fn write_file<P: AsRef<Path>>(path: P, contents: &str) -> io::Result<()> {
	let path = path.as_ref();
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}
	let mut tmp = path.as_os_str().to_owned();
	tmp.push(".partial");
	let written = fs::write(&tmp, contents).and_then(|()| fs::rename(&tmp, path));
	if written.is_err() {
		let _ = fs::remove_file(&tmp);
	}
	written
}
