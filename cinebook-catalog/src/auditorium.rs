use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cinebook_core::seat::SeatId;

/// Projection format of an auditorium.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditoriumKind {
    #[serde(rename = "2D")]
    TwoD,
    #[serde(rename = "3D")]
    ThreeD,
    #[serde(rename = "IMAX")]
    Imax,
    #[serde(rename = "VIP")]
    Vip,
}

/// A physical room with a rectangular seat layout.
///
/// Rows are labelled `A`, `B`, ... `Z`, `AA`, `AB`, ...; seats within a row
/// are numbered from 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auditorium {
    pub id: Uuid,
    pub name: String,
    pub kind: AuditoriumKind,
    pub rows: u32,
    pub seats_per_row: u32,
    pub active: bool,
}

impl Auditorium {
    pub fn new(name: impl Into<String>, kind: AuditoriumKind, rows: u32, seats_per_row: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            rows,
            seats_per_row,
            active: true,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.rows * self.seats_per_row
    }

    /// Whether a seat identifier falls inside this room's layout.
    pub fn contains(&self, seat: &SeatId) -> bool {
        match row_index(&seat.row) {
            Some(index) => index < self.rows && seat.number >= 1 && seat.number <= self.seats_per_row,
            None => false,
        }
    }

    /// Every seat of the layout in row-major order.
    pub fn seats(&self) -> Vec<SeatId> {
        let mut seats = Vec::with_capacity(self.capacity() as usize);
        for row in 0..self.rows {
            let label = row_label(row);
            for number in 1..=self.seats_per_row {
                seats.push(SeatId::new(label.clone(), number));
            }
        }
        seats
    }
}

/// Zero-based row index to its label: 0 -> "A", 25 -> "Z", 26 -> "AA".
fn row_label(index: u32) -> String {
    let mut n = index + 1;
    let mut label = String::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        label.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    label
}

/// Inverse of [`row_label`]; `None` for labels that are not pure uppercase
/// letters.
fn row_index(label: &str) -> Option<u32> {
    if label.is_empty() {
        return None;
    }
    let mut n: u32 = 0;
    for c in label.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        n = n.checked_mul(26)?.checked_add(c as u32 - 'A' as u32 + 1)?;
    }
    Some(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_labels_round_trip() {
        for index in [0, 1, 25, 26, 27, 51, 52, 700] {
            let label = row_label(index);
            assert_eq!(row_index(&label), Some(index), "label {label}");
        }
        assert_eq!(row_label(0), "A");
        assert_eq!(row_label(25), "Z");
        assert_eq!(row_label(26), "AA");
    }

    #[test]
    fn test_layout_membership() {
        let room = Auditorium::new("Sala 1", AuditoriumKind::TwoD, 3, 10);

        assert!(room.contains(&SeatId::new("A", 1)));
        assert!(room.contains(&SeatId::new("C", 10)));
        assert!(!room.contains(&SeatId::new("D", 1)), "row out of range");
        assert!(!room.contains(&SeatId::new("A", 11)), "number out of range");
        assert!(!room.contains(&SeatId::new("A", 0)));
    }

    #[test]
    fn test_seat_enumeration_matches_capacity() {
        let room = Auditorium::new("Sala VIP A", AuditoriumKind::Vip, 2, 4);
        let seats = room.seats();

        assert_eq!(seats.len(), room.capacity() as usize);
        assert_eq!(seats.first().unwrap().to_string(), "A1");
        assert_eq!(seats.last().unwrap().to_string(), "B4");
    }
}
