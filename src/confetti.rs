use rand::seq::SliceRandom;
use rand::Rng;

/// Seconds the finish celebration stays on screen
pub const CONFETTI_SECS: f64 = 5.0;

const SYMBOLS: [char; 6] = ['*', '+', 'o', '~', '•', '✦'];
const BANNER: &str = "WORKOUT COMPLETE";
const GRAVITY: f64 = 6.0;

#[derive(Debug, Clone)]
pub struct ConfettiPiece {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    /// banner letters drift into place and stay there
    pub is_banner: bool,
    pub target_x: f64,
    pub target_y: f64,
}

impl ConfettiPiece {
    fn falling<R: Rng + ?Sized>(x: f64, rng: &mut R) -> Self {
        Self {
            x,
            y: rng.gen_range(-4.0..0.0),
            vel_x: rng.gen_range(-2.0..2.0),
            vel_y: rng.gen_range(1.0..4.0),
            symbol: *SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
            is_banner: false,
            target_x: x,
            target_y: 0.0,
        }
    }

    fn banner(symbol: char, from: (f64, f64), to: (f64, f64), color_index: usize) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: to.0 - from.0,
            vel_y: to.1 - from.1,
            symbol,
            color_index,
            is_banner: true,
            target_x: to.0,
            target_y: to.1,
        }
    }

    fn update(&mut self, dt: f64) {
        if self.is_banner {
            let dist = ((self.target_x - self.x).powi(2) + (self.target_y - self.y).powi(2)).sqrt();
            if dist > 0.5 {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
            } else {
                self.x = self.target_x;
                self.y = self.target_y;
            }
        } else {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_y += GRAVITY * dt;
        }
    }
}

/// Confetti shower shown once the last round is over
#[derive(Debug, Default)]
pub struct Confetti {
    pub pieces: Vec<ConfettiPiece>,
    pub is_active: bool,
    elapsed: f64,
    width: f64,
    height: f64,
}

impl Confetti {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<R: Rng + ?Sized>(&mut self, width: u16, height: u16, rng: &mut R) {
        self.pieces.clear();
        self.is_active = true;
        self.elapsed = 0.0;
        self.width = width as f64;
        self.height = height as f64;

        let center_x = self.width / 2.0;
        let center_y = self.height / 2.0;
        let start_x = center_x - BANNER.chars().count() as f64 / 2.0;
        for (i, ch) in BANNER.chars().enumerate().filter(|(_, c)| *c != ' ') {
            let from = (
                center_x + rng.gen_range(-10.0..10.0),
                center_y + rng.gen_range(-5.0..5.0),
            );
            let to = (start_x + i as f64, center_y - 2.0);
            self.pieces
                .push(ConfettiPiece::banner(ch, from, to, rng.gen_range(0..6)));
        }

        for _ in 0..(width / 2).max(10) {
            let x = rng.gen_range(0.0..self.width.max(1.0));
            self.pieces.push(ConfettiPiece::falling(x, rng));
        }
    }

    /// Advance by `dt` seconds; pieces that leave the screen are dropped.
    pub fn update(&mut self, dt: f64) {
        if !self.is_active {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= CONFETTI_SECS {
            self.is_active = false;
            self.pieces.clear();
            return;
        }

        let (width, height) = (self.width, self.height);
        self.pieces.retain_mut(|piece| {
            piece.update(dt);
            piece.is_banner || (piece.y <= height + 2.0 && piece.x >= -2.0 && piece.x <= width + 2.0)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_start_builds_banner_and_falling_pieces() {
        let mut confetti = Confetti::new();
        assert!(!confetti.is_active);
        confetti.start(80, 24, &mut StdRng::seed_from_u64(1));
        assert!(confetti.is_active);

        let banner: String = confetti
            .pieces
            .iter()
            .filter(|p| p.is_banner)
            .map(|p| p.symbol)
            .collect();
        assert_eq!(banner, "WORKOUTCOMPLETE");
        assert_eq!(confetti.pieces.iter().filter(|p| !p.is_banner).count(), 40);
    }

    #[test]
    fn test_banner_settles_on_target() {
        let mut piece = ConfettiPiece::banner('W', (0.0, 0.0), (10.0, 5.0), 0);
        for _ in 0..40 {
            piece.update(0.1);
        }
        assert_eq!((piece.x, piece.y), (10.0, 5.0));
    }

    #[test]
    fn test_falling_pieces_accelerate() {
        let mut piece = ConfettiPiece::falling(5.0, &mut StdRng::seed_from_u64(2));
        let vel_y = piece.vel_y;
        piece.update(0.1);
        assert!(piece.vel_y > vel_y);
    }

    #[test]
    fn test_ends_after_duration() {
        let mut confetti = Confetti::new();
        confetti.start(40, 12, &mut StdRng::seed_from_u64(3));
        for _ in 0..49 {
            confetti.update(0.1);
        }
        assert!(confetti.is_active);
        for _ in 0..2 {
            confetti.update(0.1);
        }
        assert!(!confetti.is_active);
        assert!(confetti.pieces.is_empty());
    }

    #[test]
    fn test_off_screen_pieces_removed() {
        let mut confetti = Confetti::new();
        confetti.start(20, 10, &mut StdRng::seed_from_u64(4));
        confetti.pieces.push(ConfettiPiece {
            x: 100.0,
            y: 100.0,
            ..ConfettiPiece::falling(0.0, &mut StdRng::seed_from_u64(5))
        });
        confetti.update(0.1);
        assert!(confetti
            .pieces
            .iter()
            .all(|p| p.is_banner || (p.x <= 22.0 && p.y <= 12.0)));
    }
}
