use crate::errors::RenderError;

/// WinAnsi 在 0x80..=0x9F 区间额外编码的字符
const WIN_ANSI_EXTRAS: &[char] = &[
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•',
    '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

fn is_win_ansi(ch: char) -> bool {
    (' '..='~').contains(&ch) || ('\u{A0}'..='\u{FF}').contains(&ch) || WIN_ANSI_EXTRAS.contains(&ch)
}

/// 内置 Helvetica 只能输出 WinAnsi 字符，其余字符会被静默丢弃，
/// 因此在排版前拒绝这类文本。换行 (`\n`、`\r\n`) 由折行处理，允许出现。
pub fn ensure_encodable(text: &str) -> Result<(), RenderError> {
    for (offset, ch) in text.char_indices() {
        let line_break = ch == '\n' || (ch == '\r' && text[offset + 1..].starts_with('\n'));
        if !line_break && !is_win_ansi(ch) {
            return Err(RenderError::UnsupportedChar { ch, offset });
        }
    }
    Ok(())
}
