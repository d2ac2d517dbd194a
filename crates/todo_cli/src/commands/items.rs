//! Local item commands: list, add, done, remove.

use super::{open_store, CliError, Output};
use std::io::Write;
use todo_codec::{Importance, Item, ItemCodec, JsonCodec, Timestamp};
use todo_core::StoreConfig;

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Prints the items in creation order.
pub fn list(
    config: &StoreConfig,
    all: bool,
    format: &str,
    out: &mut impl Write,
) -> CommandResult<()> {
    let output = Output::parse(format)?;
    let store = open_store(config)?;
    let items: Vec<Item> = store
        .items_by_creation()
        .into_iter()
        .filter(|item| all || !item.done())
        .collect();

    match output {
        Output::Json => {
            let bytes = JsonCodec::pretty().encode(&items)?;
            out.write_all(&bytes)?;
            writeln!(out)?;
        }
        Output::Text => {
            if items.is_empty() {
                writeln!(out, "No items.")?;
            }
            for item in &items {
                print_item(item, out)?;
            }
        }
    }
    Ok(())
}

/// Prints one item as a single line.
pub fn print_item(item: &Item, out: &mut impl Write) -> std::io::Result<()> {
    let mark = if item.done() { "x" } else { " " };
    write!(out, "[{mark}] {}  {}", item.id(), item.text())?;
    if !item.importance().is_basic() {
        write!(out, "  !{}", item.importance())?;
    }
    if let Some(deadline) = item.deadline() {
        write!(out, "  due {deadline}")?;
    }
    if let Some(color) = item.color() {
        write!(out, "  {color}")?;
    }
    writeln!(out)
}

/// Creates and saves a new item.
pub fn add(
    config: &StoreConfig,
    text: &str,
    importance: Importance,
    deadline: Option<i64>,
    color: Option<String>,
) -> CommandResult<Item> {
    let deadline = deadline
        .map(|secs| Timestamp::from_secs(secs).ok_or(CliError::InvalidDeadline(secs)))
        .transpose()?;

    let item = Item::create(text)
        .with_importance(importance)
        .with_deadline(deadline)
        .with_color(color);

    let mut store = open_store(config)?;
    store.add(item.clone());
    store.save()?;
    tracing::debug!(id = item.id(), "item added");
    Ok(item)
}

/// Sets the done flag of an item.
pub fn set_done(config: &StoreConfig, id: &str, done: bool) -> CommandResult<Item> {
    let mut store = open_store(config)?;
    let item = store
        .get(id)
        .cloned()
        .ok_or_else(|| CliError::NotFound(id.to_string()))?
        .with_done(done)
        .edited(Timestamp::now());
    store.add(item.clone());
    store.save()?;
    Ok(item)
}

/// Removes an item.
pub fn remove(config: &StoreConfig, id: &str) -> CommandResult<Item> {
    let mut store = open_store(config)?;
    let item = store
        .remove(id)
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;
    store.save()?;
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> StoreConfig {
        StoreConfig::new().directory(dir.path())
    }

    fn listing(config: &StoreConfig, all: bool) -> String {
        let mut out = Vec::new();
        list(config, all, "text", &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn add_done_remove() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        assert_eq!(listing(&config, true), "No items.\n");

        let item = add(&config, "water plants", Importance::Important, Some(86_400), None)
            .unwrap();
        let text = listing(&config, false);
        assert!(text.contains("water plants"));
        assert!(text.contains("!important"));
        assert!(text.contains("due 1970-01-02"));

        let done = set_done(&config, item.id(), true).unwrap();
        assert!(done.done());
        assert!(done.changed_at().is_some());
        assert!(!listing(&config, false).contains("water plants"));
        assert!(listing(&config, true).contains("[x]"));

        remove(&config, item.id()).unwrap();
        assert_eq!(listing(&config, true), "No items.\n");
    }

    #[test]
    fn unknown_ids_fail() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        assert!(set_done(&config, "nope", true).is_err());
        assert!(remove(&config, "nope").is_err());
    }

    #[test]
    fn json_listing_is_codec_output() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let item = add(&config, "one", Importance::Basic, None, Some("#112233".into())).unwrap();

        let mut out = Vec::new();
        list(&config, true, "json", &mut out).unwrap();
        let decoded = JsonCodec::new().decode(&out).unwrap();
        assert_eq!(decoded, vec![item]);
    }
}
