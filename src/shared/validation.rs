//! Input validation and sanitization
//!
//! Validators used by the request handlers before anything reaches the
//! store, and by the client before anything reaches the network. Each one
//! either returns the normalized value or a `SharedError::ValidationError`
//! naming the offending field.
//!
//! Snippet code is never sanitized: it is stored byte-for-byte. Free text
//! (titles, descriptions, names) has markup and control characters removed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::shared::error::SharedError;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const MAX_CODE_BYTES: usize = 100 * 1024;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_CHARS: usize = 30;
pub const MAX_FOLDER_NAME_CHARS: usize = 50;
pub const MIN_GROUP_NAME_CHARS: usize = 3;
pub const MAX_GROUP_NAME_CHARS: usize = 60;
pub const MAX_BIO_CHARS: usize = 500;
pub const MAX_DISPLAY_NAME_CHARS: usize = 60;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_PASSWORD_CHARS: usize = 128;
pub const MAX_EMAIL_CHARS: usize = 254;
pub const MAX_API_KEY_NAME_CHARS: usize = 50;
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Languages a snippet may be tagged with
pub const LANGUAGES: &[&str] = &[
    "bash", "c", "cpp", "csharp", "css", "dart", "dockerfile", "elixir", "go", "graphql",
    "haskell", "html", "java", "javascript", "json", "kotlin", "lua", "markdown", "php",
    "plaintext", "powershell", "python", "r", "ruby", "rust", "scala", "scss", "sql", "swift",
    "toml", "typescript", "xml", "yaml", "zig",
];

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static USERNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{2,29}$").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9+#._-]*$").unwrap());

/// Strip markup and control characters (keeping newlines and tabs), then trim
pub fn sanitize_text(input: &str) -> String {
    let without_tags = HTML_TAG.replace_all(input, "");
    CONTROL_CHARS.replace_all(&without_tags, "").trim().to_string()
}

/// `sanitize_text` plus whitespace runs collapsed to a single space
pub fn sanitize_title(input: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&sanitize_text(input), " ")
        .into_owned()
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), SharedError> {
    let len = value.chars().count();
    if len < min {
        if min == 1 {
            return Err(SharedError::validation(field, format!("{} cannot be empty", field)));
        }
        return Err(SharedError::validation(
            field,
            format!("{} must be at least {} characters", field, min),
        ));
    }
    if len > max {
        return Err(SharedError::validation(
            field,
            format!("{} must be at most {} characters", field, max),
        ));
    }
    Ok(())
}

/// Validate and lower-case an email address
pub fn validate_email(email: &str) -> Result<String, SharedError> {
    let email = email.trim().to_lowercase();
    if email.len() > MAX_EMAIL_CHARS || !EMAIL.is_match(&email) {
        return Err(SharedError::validation("email", "Invalid email format"));
    }
    Ok(email)
}

/// Usernames are 3-30 chars, start with a letter, then letters, digits or `_`
pub fn validate_username(username: &str) -> Result<String, SharedError> {
    let username = username.trim();
    if !USERNAME.is_match(username) {
        return Err(SharedError::validation(
            "username",
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }
    Ok(username.to_string())
}

pub fn validate_password(password: &str) -> Result<(), SharedError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_CHARS {
        return Err(SharedError::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_CHARS),
        ));
    }
    if len > MAX_PASSWORD_CHARS {
        return Err(SharedError::validation(
            "password",
            format!("Password must be at most {} characters", MAX_PASSWORD_CHARS),
        ));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<String, SharedError> {
    let title = sanitize_title(title);
    check_length("title", &title, 1, MAX_TITLE_CHARS)?;
    Ok(title)
}

/// Blank descriptions become `None`
pub fn validate_description(description: Option<&str>) -> Result<Option<String>, SharedError> {
    let Some(description) = description else {
        return Ok(None);
    };
    let description = sanitize_text(description);
    if description.is_empty() {
        return Ok(None);
    }
    check_length("description", &description, 1, MAX_DESCRIPTION_CHARS)?;
    Ok(Some(description))
}

/// Code is kept verbatim; only blank, oversized or NUL-containing input is rejected
pub fn validate_code(code: &str) -> Result<(), SharedError> {
    if code.trim().is_empty() {
        return Err(SharedError::validation("code", "code cannot be empty"));
    }
    if code.len() > MAX_CODE_BYTES {
        return Err(SharedError::validation(
            "code",
            format!("code must be at most {} bytes", MAX_CODE_BYTES),
        ));
    }
    if code.contains('\0') {
        return Err(SharedError::validation("code", "code cannot contain NUL bytes"));
    }
    Ok(())
}

/// Resolve a language name (or common alias) to its canonical lower-case form
pub fn validate_language(language: &str) -> Result<String, SharedError> {
    let lowered = language.trim().to_lowercase();
    let canonical = match lowered.as_str() {
        "js" | "jsx" | "node" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "rs" => "rust",
        "sh" | "shell" | "zsh" => "bash",
        "c++" => "cpp",
        "c#" | "cs" => "csharp",
        "yml" => "yaml",
        "md" => "markdown",
        "text" | "txt" | "" => "plaintext",
        "golang" => "go",
        "rb" => "ruby",
        "kt" => "kotlin",
        "ps1" => "powershell",
        other => other,
    };
    if LANGUAGES.contains(&canonical) {
        Ok(canonical.to_string())
    } else {
        Err(SharedError::validation(
            "language",
            format!("Unsupported language: {}", language.trim()),
        ))
    }
}

/// Lower-case, trim and de-duplicate tags, keeping first-seen order
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, SharedError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || normalized.contains(&tag) {
            continue;
        }
        if tag.chars().count() > MAX_TAG_CHARS {
            return Err(SharedError::validation(
                "tags",
                format!("Tags must be at most {} characters", MAX_TAG_CHARS),
            ));
        }
        if !TAG.is_match(&tag) {
            return Err(SharedError::validation(
                "tags",
                format!("Invalid tag: {}", tag),
            ));
        }
        normalized.push(tag);
    }
    if normalized.len() > MAX_TAGS {
        return Err(SharedError::validation(
            "tags",
            format!("At most {} tags are allowed", MAX_TAGS),
        ));
    }
    Ok(normalized)
}

pub fn validate_folder_name(name: &str) -> Result<String, SharedError> {
    let name = sanitize_title(name);
    check_length("name", &name, 1, MAX_FOLDER_NAME_CHARS)?;
    Ok(name)
}

pub fn validate_group_name(name: &str) -> Result<String, SharedError> {
    let name = sanitize_title(name);
    check_length("name", &name, MIN_GROUP_NAME_CHARS, MAX_GROUP_NAME_CHARS)?;
    Ok(name)
}

pub fn validate_api_key_name(name: &str) -> Result<String, SharedError> {
    let name = sanitize_title(name);
    check_length("name", &name, 1, MAX_API_KEY_NAME_CHARS)?;
    Ok(name)
}

pub fn validate_display_name(name: Option<&str>) -> Result<Option<String>, SharedError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let name = sanitize_title(name);
    if name.is_empty() {
        return Ok(None);
    }
    check_length("display_name", &name, 1, MAX_DISPLAY_NAME_CHARS)?;
    Ok(Some(name))
}

pub fn validate_bio(bio: Option<&str>) -> Result<Option<String>, SharedError> {
    let Some(bio) = bio else {
        return Ok(None);
    };
    let bio = sanitize_text(bio);
    if bio.is_empty() {
        return Ok(None);
    }
    check_length("bio", &bio, 1, MAX_BIO_CHARS)?;
    Ok(Some(bio))
}

/// Resolve `limit`/`offset` query values: limit 1-100 (default 50), offset >= 0
pub fn validate_pagination(limit: Option<i64>, offset: Option<i64>) -> Result<(i64, i64), SharedError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(SharedError::validation(
            "limit",
            format!("limit must be between 1 and {}", MAX_PAGE_SIZE),
        ));
    }
    let offset = offset.unwrap_or(0);
    if offset < 0 {
        return Err(SharedError::validation("offset", "offset cannot be negative"));
    }
    Ok((limit, offset))
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
