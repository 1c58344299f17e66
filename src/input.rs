use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// Where Termux exposes Telegram downloads, relative to the home directory.
pub const TELEGRAM_DIR: &str = "../storage/downloads/Telegram";

/// Resolve the dumps to read: a single file, every `.txt` in a directory,
/// or the newest Telegram download when `termux` is set.
pub fn locate(input: Option<&Path>, termux: bool) -> Result<Vec<PathBuf>> {
    if termux {
        return newest_txt(Path::new(TELEGRAM_DIR)).map(|p| vec![p]);
    }
    let Some(path) = input else {
        bail!("informe um arquivo ou pasta de entrada (ou use --termux)");
    };
    if path.is_dir() {
        let files = txt_files(path)?;
        if files.is_empty() {
            bail!("nenhum arquivo .txt em {}", path.display());
        }
        info!(dir = %path.display(), files = files.len(), "pasta de entrada");
        return Ok(files);
    }
    if !path.exists() {
        bail!("arquivo nao encontrado: {}", path.display());
    }
    Ok(vec![path.to_path_buf()])
}

fn txt_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("lendo {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e.eq_ignore_ascii_case("txt")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn newest_txt(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        bail!("diretorio do Telegram nao encontrado: {}", dir.display());
    }
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for path in txt_files(dir)? {
        let modified = fs::metadata(&path)?.modified()?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }
    match newest {
        Some((_, path)) => {
            info!(file = %path.display(), "ultimo download do Telegram");
            Ok(path)
        }
        None => bail!("nenhum arquivo .txt em {}", dir.display()),
    }
}

pub fn read(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("lendo {}", path.display()))?;
    Ok(decode(bytes))
}

/// UTF-8 when valid, otherwise Latin-1 so accented bytes still reach the normalizer.
pub fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("entrada nao e UTF-8 valido, decodificando como Latin-1");
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_utf8_and_latin1() {
        assert_eq!(decode("João".as_bytes().to_vec()), "João");
        assert_eq!(decode(vec![b'J', b'o', 0xE3, b'o']), "João");
    }

    #[test]
    fn locate_needs_an_input() {
        assert!(locate(None, false).is_err());
        assert!(locate(Some(Path::new("tests/fixtures/nao-existe.txt")), false).is_err());
    }

    #[test]
    fn locate_directory_lists_txt_sorted() {
        let files = locate(Some(Path::new("tests/fixtures")), false).unwrap();
        assert!(files.len() >= 2);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
        assert!(files.iter().all(|f| f.extension().unwrap() == "txt"));
    }
}
