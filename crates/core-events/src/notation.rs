//! Vi key notation parser (`"d2w<Esc>"`, `"<C-r>"`, `"ihello<CR>"`).
//!
//! Printable characters stand for themselves. Angle-bracket groups name
//! control keys or chords; `<lt>` is a literal `<`. A `<` that does not start
//! a well formed group is an error rather than a literal so typos in key
//! scripts surface early.

use crate::{EventResult, KeyCode, KeyEvent, KeyModifiers};
use anyhow::{anyhow, bail};

/// Parse a whole key script into discrete key events.
pub fn parse_keys(input: &str) -> EventResult<Vec<KeyEvent>> {
    let mut out = Vec::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '<' {
            out.push(KeyEvent::char(c));
            continue;
        }
        let rest = &input[idx + 1..];
        let close = rest
            .find('>')
            .ok_or_else(|| anyhow!("unterminated key group at byte {idx}"))?;
        let group = &rest[..close];
        out.push(parse_group(group)?);
        // Skip the group body and the closing '>'.
        for _ in 0..group.chars().count() + 1 {
            chars.next();
        }
    }
    tracing::trace!(target: "events.notation", keys = out.len(), "parsed_key_script");
    Ok(out)
}

fn parse_group(group: &str) -> EventResult<KeyEvent> {
    let mut mods = KeyModifiers::empty();
    let mut name = group;
    loop {
        let lower = name.to_ascii_lowercase();
        if lower.starts_with("c-") && name.len() > 2 {
            mods |= KeyModifiers::CTRL;
            name = &name[2..];
        } else if (lower.starts_with("a-") || lower.starts_with("m-")) && name.len() > 2 {
            mods |= KeyModifiers::ALT;
            name = &name[2..];
        } else if lower.starts_with("s-") && name.len() > 2 {
            mods |= KeyModifiers::SHIFT;
            name = &name[2..];
        } else {
            break;
        }
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "del" | "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "lt" => KeyCode::Char('<'),
        "space" => KeyCode::Char(' '),
        "bar" => KeyCode::Char('|'),
        _ => {
            let mut it = name.chars();
            match (it.next(), it.next()) {
                (Some(c), None) if !mods.is_empty() => KeyCode::Char(c),
                _ => bail!("unknown key name <{group}>"),
            }
        }
    };
    Ok(KeyEvent { code, mods })
}
