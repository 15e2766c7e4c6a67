use glam::Vec2;

/// Last known pointer position, relative to the container's top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerTracker {
    position: Vec2,
    moves: u64,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a move given in client coordinates.
    pub fn handle_move(&mut self, client: Vec2, container_offset: Vec2) {
        self.position = client - container_offset;
        self.moves += 1;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Number of move events seen.
    pub fn moves(&self) -> u64 {
        self.moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtracts_container_offset() {
        let mut p = PointerTracker::new();
        p.handle_move(Vec2::new(110.0, 220.0), Vec2::new(10.0, 20.0));
        assert_eq!(p.position(), Vec2::new(100.0, 200.0));
    }

    #[test]
    fn latest_move_wins() {
        let mut p = PointerTracker::new();
        p.handle_move(Vec2::new(1.0, 1.0), Vec2::ZERO);
        p.handle_move(Vec2::new(5.0, 6.0), Vec2::ZERO);
        assert_eq!(p.position(), Vec2::new(5.0, 6.0));
        assert_eq!(p.moves(), 2);
    }
}
