use bitflags::bitflags;

bitflags! {
    /// Host-visible values changed during one tick
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InfoChanged: u8 {
        const POSITION = (1 << 0);
        const PATTERN = (1 << 1);
        const SPEED = (1 << 2);
        const TEMPO = (1 << 3);
    }
}

/// Status line kinds a host may display
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InfoLine {
    Position,
    Pattern,
    Speed,
    Tempo,
}

impl InfoLine {
    pub const ALL: [InfoLine; 4] = [
        InfoLine::Position,
        InfoLine::Pattern,
        InfoLine::Speed,
        InfoLine::Tempo,
    ];

    pub fn flag(self) -> InfoChanged {
        match self {
            InfoLine::Position => InfoChanged::POSITION,
            InfoLine::Pattern => InfoChanged::PATTERN,
            InfoLine::Speed => InfoChanged::SPEED,
            InfoLine::Tempo => InfoChanged::TEMPO,
        }
    }
}

/// (line id, formatted value) pair sent to the host status display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub line: InfoLine,
    pub line_id: usize,
    pub value: String,
}
