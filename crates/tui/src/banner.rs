//! Large block-letter title for the main menu.

const GLYPH_HEIGHT: usize = 5;
const FILL: char = '█';
const GAP: &str = " ";

/// Glyph rows for the letters used in titles. `1` marks a filled cell.
fn glyph(ch: char) -> Option<[&'static str; GLYPH_HEIGHT]> {
    let rows = match ch.to_ascii_uppercase() {
        'D' => ["1110", "1001", "1001", "1001", "1110"],
        'E' => ["1111", "1000", "1110", "1000", "1111"],
        'I' => ["111", "010", "010", "010", "111"],
        'M' => ["10001", "11011", "10101", "10001", "10001"],
        'N' => ["1001", "1101", "1011", "1001", "1001"],
        'P' => ["1110", "1001", "1110", "1000", "1000"],
        ' ' => ["00", "00", "00", "00", "00"],
        _ => return None,
    };
    Some(rows)
}

/// Render `text` as block letters. Characters without a glyph are skipped.
pub fn render(text: &str) -> Vec<String> {
    let glyphs: Vec<_> = text.chars().filter_map(glyph).collect();
    (0..GLYPH_HEIGHT)
        .map(|row| {
            glyphs
                .iter()
                .map(|rows| {
                    rows[row]
                        .chars()
                        .map(|cell| if cell == '1' { FILL } else { ' ' })
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join(GAP)
                .trim_end()
                .to_string()
        })
        .collect()
}
