use eframe::egui::{Color32, Pos2, Rect, Vec2};

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn parse_hex_color(raw: &str, fallback: Color32) -> Color32 {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return fallback;
    }

    let Ok(value) = u32::from_str_radix(hex, 16) else {
        return fallback;
    };
    Color32::from_rgb(
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn screen_world_round_trip() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let pan = vec2(40.0, -12.0);
        let zoom = 1.7;
        let world = vec2(123.0, -456.0);

        let screen = world_to_screen(rect, pan, zoom, world);
        let back = screen_to_world(rect, pan, zoom, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn hex_colors_parse_with_fallback() {
        let fallback = Color32::from_rgb(1, 2, 3);
        assert_eq!(
            parse_hex_color("#d4af37", fallback),
            Color32::from_rgb(0xd4, 0xaf, 0x37)
        );
        assert_eq!(
            parse_hex_color("8e24aa", fallback),
            Color32::from_rgb(0x8e, 0x24, 0xaa)
        );
        assert_eq!(parse_hex_color("", fallback), fallback);
        assert_eq!(parse_hex_color("#zzzzzz", fallback), fallback);
        assert_eq!(parse_hex_color("#fff", fallback), fallback);
    }
}
