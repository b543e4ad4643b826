use crate::error::AppError;
use crate::model::TaskList;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const STORE_FILE_NAME: &str = "tasks.txt";
const STORE_ENV_VAR: &str = "TT_STORE_PATH";

/// Resolves the store location: `TT_STORE_PATH`, then the configured path,
/// then the per-user default.
pub fn store_path(configured: Option<&str>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("tt").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("tt")
            .join(STORE_FILE_NAME))
    }
}

pub fn read_list<R: Read>(mut source: R) -> Result<TaskList, AppError> {
    let mut content = String::new();
    source
        .read_to_string(&mut content)
        .map_err(|err| AppError::io(err.to_string()))?;
    TaskList::parse(&content)
}

pub fn write_list<W: Write>(list: &TaskList, mut destination: W) -> Result<(), AppError> {
    destination
        .write_all(list.format().as_bytes())
        .and_then(|_| destination.flush())
        .map_err(|err| AppError::io(err.to_string()))
}

/// Loads the list stored at `path`. A missing file is an empty list.
pub fn load_list(path: &Path) -> Result<TaskList, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "store missing, starting empty");
        return Ok(TaskList::new());
    }

    let file = std::fs::File::open(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let list = read_list(file)?;
    debug!(path = %path.display(), tasks = list.len(), "loaded store");
    Ok(list)
}

pub fn save_list(path: &Path, list: &TaskList) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let file = std::fs::File::create(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    write_list(list, file)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    debug!(path = %path.display(), tasks = list.len(), "saved store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_list, read_list, save_list, write_list};
    use crate::model::TaskList;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("tt-{nanos}-{file_name}"))
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = temp_path("tasks.txt");
        let mut list = TaskList::new();
        let first = list.create_at("demo", 100).unwrap().id();
        list.create_at("other", 200).unwrap();
        list.activate(first).unwrap();

        save_list(&path, &list).unwrap();
        let loaded = load_list(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded, list);
    }

    #[test]
    fn missing_file_loads_empty() {
        let path = temp_path("missing.txt");

        let loaded = load_list(&path).unwrap();

        assert!(loaded.is_empty());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = temp_path("nested");
        let path = dir.join("deeper").join("tasks.txt");

        save_list(&path, &TaskList::new()).unwrap();
        let exists = path.exists();
        fs::remove_dir_all(&dir).ok();

        assert!(exists);
    }

    #[test]
    fn corrupted_file_is_malformed_input() {
        let path = temp_path("corrupt.txt");
        fs::write(&path, "1! 10- \"a\"\n2! 20- \"b\"\n").unwrap();

        let err = load_list(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "malformed_input");
    }

    #[test]
    fn reader_and_writer_use_the_line_format() {
        let mut list = TaskList::new();
        list.create_at("in memory", 5).unwrap();

        let mut buffer = Vec::new();
        write_list(&list, &mut buffer).unwrap();
        assert_eq!(buffer, b"1 5- \"in memory\"\n");

        let parsed = read_list(buffer.as_slice()).unwrap();
        assert_eq!(parsed, list);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path("private.txt");
        save_list(&path, &TaskList::new()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        fs::remove_file(&path).ok();

        assert_eq!(mode & 0o777, 0o600);
    }
}
