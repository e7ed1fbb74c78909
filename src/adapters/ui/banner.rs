//! Welcome banner with a warm gradient (BILL SPLIT).
//! Uses figlet's built-in standard font.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Receipt orange (#f97316).
const RECEIPT_ORANGE: (u8, u8, u8) = (0xf9, 0x73, 0x16);
/// Settled green (#10b981).
const SETTLED_GREEN: (u8, u8, u8) = (0x10, 0xb9, 0x81);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints "BILL SPLIT" in figlet art, graded from orange to green, then the version.
/// Falls back to a plain title if the font cannot be rendered.
pub fn print_welcome() {
    let mut out = stdout();
    let art = FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("BILL SPLIT").map(|figure| figure.to_string()))
        .unwrap_or_else(|| "BILL SPLIT\n".to_string());
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(RECEIPT_ORANGE, SETTLED_GREEN, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: SETTLED_GREEN.0,
        g: SETTLED_GREEN.1,
        b: SETTLED_GREEN.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Snap a receipt, split the bill\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
