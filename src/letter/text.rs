//! Text measurement, truncation, wrapping and PDF-safe transliteration.

/// Points to millimetres.
pub const PT_TO_MM: f32 = 0.352_778;

/// Heuristic: estimate the width of Helvetica text in millimetres
/// (the built-in fonts carry no metrics we can query).
pub fn estimate_text_width_mm(text: &str, font_pt: f32) -> f32 {
    text.chars().map(glyph_em).sum::<f32>() * font_pt * PT_TO_MM
}

// Rough Helvetica advance widths, in em.
fn glyph_em(ch: char) -> f32 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '-' | '/' => 0.33,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.64,
        _ => 0.53,
    }
}

/// Truncate to fit `max_mm` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_pt: f32, max_mm: f32) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        let next = format!("{out}{ch}");
        if estimate_text_width_mm(&next, font_pt) > max_mm {
            if !out.is_empty() {
                if estimate_text_width_mm(&(out.clone() + "..."), font_pt) <= max_mm {
                    out.push_str("...");
                } else if out.len() > 1 {
                    out.pop();
                    out.push_str("...");
                }
            }
            return out;
        }
        out = next;
    }
    out
}

/// Wrap text to fit within a maximum width, breaking on word boundaries where possible.
pub fn wrap_text_to_width(text: &str, font_pt: f32, max_mm: f32) -> Vec<String> {
    if max_mm <= 4.0 {
        return vec![truncate_to_width(text, font_pt, max_mm)];
    }
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if estimate_text_width_mm(&candidate, font_pt) <= max_mm {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if estimate_text_width_mm(word, font_pt) <= max_mm {
            cur = word.to_string();
            continue;
        }
        // Single long word: hard-break by characters
        let mut buf = String::new();
        for ch in word.chars() {
            let cand = format!("{buf}{ch}");
            if estimate_text_width_mm(&cand, font_pt) > max_mm && !buf.is_empty() {
                lines.push(buf);
                buf = ch.to_string();
            } else {
                buf = cand;
            }
        }
        cur = buf;
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Replace characters the built-in PDF fonts cannot show with ASCII
/// look-alikes; accents are dropped and anything else becomes `?`.
pub fn to_pdf_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            c if c.is_ascii() => out.push(c),
            '\u{2018}' | '\u{2019}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}' => out.push('"'),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2022}' | '\u{00B7}' => out.push('*'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{202F}' => out.push(' '),
            '\u{20AC}' => out.push_str("EUR"),
            '\u{00A3}' => out.push_str("GBP"),
            '\u{00E0}'..='\u{00E5}' => out.push('a'),
            '\u{00C0}'..='\u{00C5}' => out.push('A'),
            '\u{00E8}'..='\u{00EB}' => out.push('e'),
            '\u{00C8}'..='\u{00CB}' => out.push('E'),
            '\u{00EC}'..='\u{00EF}' => out.push('i'),
            '\u{00CC}'..='\u{00CF}' => out.push('I'),
            '\u{00F2}'..='\u{00F6}' => out.push('o'),
            '\u{00D2}'..='\u{00D6}' => out.push('O'),
            '\u{00F9}'..='\u{00FC}' => out.push('u'),
            '\u{00D9}'..='\u{00DC}' => out.push('U'),
            '\u{00E7}' => out.push('c'),
            '\u{00C7}' => out.push('C'),
            '\u{00F1}' => out.push('n'),
            '\u{00D1}' => out.push('N'),
            '\u{00DF}' => out.push_str("ss"),
            '\u{0153}' => out.push_str("oe"),
            '\u{0152}' => out.push_str("OE"),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_within_width() {
        let text = "The Provider undertakes to keep strictly confidential all information";
        let lines = wrap_text_to_width(text, 10.0, 40.0);
        assert!(lines.len() > 1);
        for l in &lines {
            assert!(estimate_text_width_mm(l, 10.0) <= 40.0, "{l}");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn long_word_is_broken() {
        let lines = wrap_text_to_width(&"x".repeat(200), 10.0, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat().len(), 200);
    }

    #[test]
    fn transliterates() {
        assert_eq!(to_pdf_ascii("Côte d’Ivoire – 15 000 €"), "Cote d'Ivoire - 15 000 EUR");
    }
}
