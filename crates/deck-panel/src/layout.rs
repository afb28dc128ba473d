//! Declarative panel layout.
//!
//! One table describes every control the surface carries: sliders, knobs,
//! and buttons with their fixed CC numbers, plus the keyboard geometry.
//! The table is many-to-one — several controls may share a CC.

/// CC for the first vertical slider; S1-S8 count up from here.
const SLIDER_CC_BASE: u8 = 0x11;
/// S9 shares a CC with S2.
const S9_CC: u8 = 0x12;
/// The single horizontal slider.
const SLIDER_HORIZONTAL_CC: u8 = 0x13;
/// CC for the first rotary knob; R1-R18 count up from here.
const KNOB_CC_BASE: u8 = 0x10;

/// First keyboard note (C2).
pub const KEYBOARD_BASE_NOTE: u8 = 36;
/// Keyboard span in octaves.
pub const KEYBOARD_OCTAVES: u8 = 6;
/// Keyboard span in semitones.
pub const KEYBOARD_NOTE_COUNT: u8 = KEYBOARD_OCTAVES * 12;
/// Semitones within an octave that fall on black keys.
pub const BLACK_SEMITONES: [u8; 5] = [1, 3, 6, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Slider,
    Knob,
    Button,
}

#[derive(Debug, Clone)]
pub struct Control {
    pub id: String,
    pub kind: ControlKind,
    pub cc: u8,
}

/// The full control table.
#[derive(Debug, Clone)]
pub struct PanelLayout {
    controls: Vec<Control>,
}

impl PanelLayout {
    /// The standard panel: 9 vertical sliders, one horizontal slider,
    /// 18 rotary knobs, sustain/transport buttons, and two button banks.
    pub fn standard() -> Self {
        let mut controls = Vec::new();

        for i in 0..8u8 {
            controls.push(Control {
                id: format!("S{}", i + 1),
                kind: ControlKind::Slider,
                cc: SLIDER_CC_BASE + i,
            });
        }
        controls.push(Control {
            id: "S9".to_string(),
            kind: ControlKind::Slider,
            cc: S9_CC,
        });
        controls.push(Control {
            id: "H1".to_string(),
            kind: ControlKind::Slider,
            cc: SLIDER_HORIZONTAL_CC,
        });

        for i in 0..18u8 {
            controls.push(Control {
                id: format!("R{}", i + 1),
                kind: ControlKind::Knob,
                cc: KNOB_CC_BASE + i,
            });
        }

        // Button banks share CCs: the bank is the address, the name the key.
        let buttons: &[(&str, u8)] = &[
            ("Sustain", 0x40),
            ("Back", 0x52),
            ("Stop", 0x52),
            ("Start", 0x52),
            ("Rec", 0x52),
            ("A1", 0x50),
            ("A2", 0x50),
            ("A3", 0x50),
            ("A4", 0x50),
            ("A5", 0x50),
            ("A6", 0x50),
            ("A7", 0x50),
            ("A8", 0x50),
            ("A9", 0x53),
            ("B1", 0x51),
            ("B2", 0x51),
            ("B3", 0x51),
            ("B4", 0x51),
            ("B5", 0x51),
            ("B6", 0x51),
            ("B7", 0x51),
            ("B8", 0x51),
            ("B9", 0x53),
        ];
        for &(name, cc) in buttons {
            controls.push(Control {
                id: name.to_string(),
                kind: ControlKind::Button,
                cc,
            });
        }

        Self { controls }
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, id: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }
}

/// Whether a note falls on the surface keyboard.
pub fn in_keyboard_range(note: u8) -> bool {
    (KEYBOARD_BASE_NOTE..KEYBOARD_BASE_NOTE + KEYBOARD_NOTE_COUNT).contains(&note)
}

/// Whether a note is a black key.
pub fn is_black_key(note: u8) -> bool {
    BLACK_SEMITONES.contains(&(note % 12))
}

/// Every note on the keyboard, low to high.
pub fn keyboard_notes() -> impl Iterator<Item = u8> {
    KEYBOARD_BASE_NOTE..KEYBOARD_BASE_NOTE + KEYBOARD_NOTE_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_ccs() {
        let layout = PanelLayout::standard();
        assert_eq!(layout.control("S1").unwrap().cc, 0x11);
        assert_eq!(layout.control("S8").unwrap().cc, 0x18);
        assert_eq!(layout.control("S9").unwrap().cc, 0x12);
        assert_eq!(layout.control("H1").unwrap().cc, 0x13);
    }

    #[test]
    fn test_knob_ccs() {
        let layout = PanelLayout::standard();
        assert_eq!(layout.control("R1").unwrap().cc, 0x10);
        assert_eq!(layout.control("R18").unwrap().cc, 0x21);
    }

    #[test]
    fn test_button_banks_share_ccs() {
        let layout = PanelLayout::standard();
        for i in 1..=8 {
            assert_eq!(layout.control(&format!("A{}", i)).unwrap().cc, 0x50);
            assert_eq!(layout.control(&format!("B{}", i)).unwrap().cc, 0x51);
        }
        assert_eq!(layout.control("A9").unwrap().cc, 0x53);
        assert_eq!(layout.control("B9").unwrap().cc, 0x53);
        assert_eq!(layout.control("Sustain").unwrap().cc, 0x40);
        assert_eq!(layout.control("Stop").unwrap().cc, 0x52);
    }

    #[test]
    fn test_control_census() {
        let layout = PanelLayout::standard();
        let count = |kind| {
            layout
                .controls()
                .iter()
                .filter(|c| c.kind == kind)
                .count()
        };
        assert_eq!(count(ControlKind::Slider), 10);
        assert_eq!(count(ControlKind::Knob), 18);
        assert_eq!(count(ControlKind::Button), 23);
    }

    #[test]
    fn test_keyboard_geometry() {
        assert_eq!(keyboard_notes().count(), 72);
        assert!(in_keyboard_range(36));
        assert!(in_keyboard_range(107));
        assert!(!in_keyboard_range(35));
        assert!(!in_keyboard_range(108));

        // C is white, C# is black
        assert!(!is_black_key(36));
        assert!(is_black_key(37));
        // One octave holds 5 black keys
        let blacks = (36..48).filter(|&n| is_black_key(n)).count();
        assert_eq!(blacks, 5);
    }
}
