use rand::Rng;

/// Extension used when none can be derived from the source
pub const DEFAULT_EXTENSION: &str = "jpg";

const TOKEN_LEN: usize = 11;
const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Unique destination name: `{unix_millis}_{random token}.{ext}`
pub fn generate_file_name(name_hint: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let extension = extension_from(name_hint).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{timestamp}_{}.{extension}", random_token())
}

fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Extension of a file name or URL, lowercased.
///
/// Query strings and fragments are ignored; `data:` URIs yield the extension
/// of their declared MIME type.
pub fn extension_from(name_hint: &str) -> Option<String> {
    if let Some(rest) = name_hint.strip_prefix("data:") {
        let mime_type = rest.split([';', ',']).next()?;
        let subtype = mime_type.split_once('/')?.1;
        return subtype
            .parse::<dog_image::OutputFormat>()
            .ok()
            .map(|format| format.extension().to_string())
            .or_else(|| clean_extension(subtype));
    }

    let path = name_hint.split(['?', '#']).next().unwrap_or(name_hint);
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (stem, extension) = file.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    clean_extension(extension)
}

fn clean_extension(extension: &str) -> Option<String> {
    let valid = !extension.is_empty()
        && extension.len() <= 10
        && extension.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| extension.to_ascii_lowercase())
}

/// Object path for `file_name` inside `folder`
pub fn destination_path(folder: Option<&str>, file_name: &str) -> String {
    match folder.map(|f| f.trim_matches('/')).filter(|f| !f.is_empty()) {
        Some(folder) => format!("{folder}/{file_name}"),
        None => file_name.to_string(),
    }
}

/// Split an object path into its folder (if any) and file name
pub fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('/') {
        Some((folder, name)) if !folder.is_empty() => (Some(folder), name),
        Some((_, name)) => (None, name),
        None => (None, path),
    }
}

/// File name without its last extension
pub fn file_stem(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}
