use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write `data` to `path` as pretty JSON, replacing any existing file.
pub fn save_to_file<T: Serialize>(data: &T, path: impl AsRef<Path>) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Read a JSON document from `path`.
pub fn load_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> std::io::Result<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        ));
    }

    let reader = BufReader::new(File::open(path)?);
    let data = serde_json::from_reader(reader)?;
    Ok(data)
}
