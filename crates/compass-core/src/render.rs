//! SVG rendering of the compass dial and the shareable postcard.
//!
//! Layout is decorative; the needle angle is the only geometry that has to
//! match the view exactly.

use indoc::formatdoc;

use crate::view::CompassView;

/// Needle length as a fraction of the dial radius.
const NEEDLE_LENGTH: f64 = 0.9;

/// Escape text for inclusion in SVG/XML content or attributes.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Tip of the needle in dial coordinates (y grows downward).
///
/// 0° points straight up, -90° at the low pole (left), +90° at the high pole
/// (right).
pub fn needle_tip(angle_deg: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    (NEEDLE_LENGTH * rad.sin(), -NEEDLE_LENGTH * rad.cos())
}

/// Semicircular dial with the needle at `view.needle_angle`.
pub fn dial_svg(view: &CompassView) -> String {
    let (x, y) = needle_tip(view.needle_angle);
    formatdoc! {r##"
        <svg xmlns="http://www.w3.org/2000/svg" width="300" height="200" viewBox="-1.2 -1.2 2.4 1.6">
          <path d="M -1 0 A 1 1 0 0 1 1 0" stroke="black" stroke-width="0.03" fill="none"/>
          <line x1="0" y1="0" x2="0" y2="-1" stroke="#bbb" stroke-width="0.01" stroke-dasharray="0.04"/>
          <line x1="0" y1="0" x2="{x:.4}" y2="{y:.4}" stroke="red" stroke-width="0.05" stroke-linecap="round"/>
          <circle cx="0" cy="0" r="0.05" fill="black"/>
          <text x="-1" y="0.2" font-size="0.13" text-anchor="start">{low}</text>
          <text x="1" y="0.2" font-size="0.13" text-anchor="end">{high}</text>
          <text x="0" y="0.35" font-size="0.11" text-anchor="middle">{label}</text>
        </svg>
    "##,
        x = x,
        y = y,
        low = escape_xml(&view.poles.low),
        high = escape_xml(&view.poles.high),
        label = escape_xml(&view.bias_label),
    }
}

/// Shareable card: the dial plus the day's bias, quote, message and counters.
pub fn postcard_svg(view: &CompassView) -> String {
    let dial = dial_svg(view);
    let quote = view.quote.as_deref().unwrap_or_default();
    let message = view.message.as_deref().unwrap_or_default();
    let tally = format!(
        "{}: {} days · {}: {} days",
        view.poles.high, view.ban_count, view.poles.low, view.mum_count
    );

    formatdoc! {r##"
        <svg xmlns="http://www.w3.org/2000/svg" width="600" height="420" viewBox="0 0 600 420">
          <rect x="0" y="0" width="600" height="420" rx="18" fill="#fdf6ec" stroke="#c9a27e" stroke-width="4"/>
          <text x="300" y="42" font-size="24" text-anchor="middle" font-family="serif">{title}</text>
          <text x="300" y="68" font-size="14" text-anchor="middle" fill="#666">{date}</text>
          <g transform="translate(150 80)">
        {dial}  </g>
          <text x="300" y="320" font-size="16" text-anchor="middle" font-style="italic">{quote}</text>
          <text x="300" y="350" font-size="15" text-anchor="middle">{message}</text>
          <text x="300" y="390" font-size="13" text-anchor="middle" fill="#444">{tally}</text>
        </svg>
    "##,
        title = escape_xml(&format!("{} ↔ {} Compass", view.poles.low, view.poles.high)),
        date = view.date.format("%d %B %Y"),
        dial = dial,
        quote = escape_xml(quote),
        message = escape_xml(message),
        tally = escape_xml(&tally),
    }
}

/// Plain-text rendering of the postcard, for terminals.
pub fn postcard_text(view: &CompassView) -> String {
    let mut lines = vec![
        format!("{} ↔ {} Compass - {}", view.poles.low, view.poles.high, view.date),
        format!("{} (needle {:+.1}°)", view.bias_label, view.needle_angle),
    ];
    if let Some(quote) = &view.quote {
        lines.push(format!("“{quote}”"));
    }
    if let Some(message) = &view.message {
        lines.push(message.clone());
    }
    lines.push(format!(
        "{}: {} days | {}: {} days",
        view.poles.high, view.ban_count, view.poles.low, view.mum_count
    ));
    lines.join("\n")
}
