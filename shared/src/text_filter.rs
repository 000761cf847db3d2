use crate::category::CategoryKey;

/// Line separator used when rejoining kept lines; tooltips are HTML.
pub const LINE_BREAK: &str = "<br>";

fn keywords(mode: CategoryKey) -> Option<&'static [&'static str]> {
    match mode {
        CategoryKey::Blueprint => Some(&["設計図", "Blueprint", "Recipe"]),
        CategoryKey::Lem => Some(&["LEM"]),
        CategoryKey::Warbond => Some(&["戦時", "Warbond"]),
        CategoryKey::Scanner => Some(&["スキャナー", "Scanner"]),
        _ => None,
    }
}

/// Keep only the lines of `text` that mention the focused category.
///
/// Best effort: modes without a keyword list, and texts where no line
/// matches, come back unchanged so a tooltip is never blanked.
pub fn clean_text_for_filter(text: &str, mode: CategoryKey) -> String {
    let Some(targets) = keywords(mode) else {
        return text.to_string();
    };

    let kept: Vec<&str> = split_lines(text)
        .filter(|line| targets.iter().any(|k| line.contains(k)))
        .collect();

    if kept.is_empty() {
        text.to_string()
    } else {
        kept.join(LINE_BREAK)
    }
}

/// Split on `\r\n`, `\n`, `\r` and `<br>`.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(LINE_BREAK)
        .flat_map(|chunk| chunk.split('\n'))
        .flat_map(|chunk| chunk.split('\r'))
}
