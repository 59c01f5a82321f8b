use rand::Rng;

// Logical playfield units. The renderer scales these to whatever terminal
// size it gets; game code never sees terminal coordinates.
pub const PLAYFIELD_W: f64 = 800.0;
pub const PLAYFIELD_H: f64 = 600.0;
pub const BODY_SIZE: f64 = 80.0;
pub const BODY_X: f64 = 150.0;
pub const OBSTACLE_W: f64 = 80.0;
pub const GAP_H: f64 = 220.0;
pub const GAP_MARGIN: f64 = 50.0;
pub const GRAVITY: f64 = 0.5;
pub const JUMP_VEL: f64 = -10.0;
pub const SCROLL_SPEED: f64 = 2.5;
pub const SPAWN_SPACING: f64 = 350.0;

/// A paired upper/lower column with a passable gap. `x` is the left edge,
/// `gap_top` the offset where the gap starts.
pub struct Obstacle {
    pub x: f64,
    pub gap_top: f64,
    pub scored: bool,
}

impl Obstacle {
    pub fn gap_bottom(&self) -> f64 {
        self.gap_top + GAP_H
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Ready,
    Playing,
    Over,
}

/// One playthrough. Replaced wholesale on reset, never patched back to a
/// playable state after going Over.
pub struct Game {
    pub y: f64,
    pub vy: f64,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    pub state: State,
}

impl Game {
    pub fn new() -> Self {
        Game {
            y: PLAYFIELD_H / 2.0,
            vy: 0.0,
            obstacles: Vec::new(),
            score: 0,
            state: State::Ready,
        }
    }

    /// The single jump action. First press only arms the session; after
    /// that each press overrides the velocity outright. Dead sessions
    /// ignore it.
    pub fn jump(&mut self) {
        match self.state {
            State::Ready => self.state = State::Playing,
            State::Playing => self.vy = JUMP_VEL,
            State::Over => {}
        }
    }

    pub fn reset(&mut self) {
        *self = Game::new();
    }

    /// One fixed-timestep frame. Update order is load-bearing: integrate,
    /// bounds, spawn, scroll, score, collide, prune. Scoring runs before
    /// collision and pruning so a just-passed obstacle still counts.
    pub fn step(&mut self, rng: &mut impl Rng) {
        if self.state != State::Playing {
            return;
        }

        self.vy += GRAVITY;
        self.y += self.vy;

        if self.y < 0.0 || self.y > PLAYFIELD_H - BODY_SIZE {
            self.state = State::Over;
            return;
        }

        let should_spawn = match self.obstacles.last() {
            None => true,
            Some(last) => last.x < PLAYFIELD_W - SPAWN_SPACING,
        };
        if should_spawn {
            self.obstacles.push(Obstacle {
                x: PLAYFIELD_W,
                gap_top: rng.gen_range(GAP_MARGIN..PLAYFIELD_H - GAP_H - GAP_MARGIN),
                scored: false,
            });
        }

        for ob in &mut self.obstacles {
            ob.x -= SCROLL_SPEED;
        }

        for ob in &mut self.obstacles {
            if !ob.scored && ob.x + OBSTACLE_W < BODY_X {
                ob.scored = true;
                self.score += 1;
            }
        }

        if self.obstacles.iter().any(|ob| self.hits(ob)) {
            self.state = State::Over;
            return;
        }

        self.obstacles.retain(|ob| ob.x + OBSTACLE_W >= 0.0);
    }

    fn hits(&self, ob: &Obstacle) -> bool {
        let x_overlap = BODY_X < ob.x + OBSTACLE_W && BODY_X + BODY_SIZE > ob.x;
        x_overlap && (self.y < ob.gap_top || self.y + BODY_SIZE > ob.gap_bottom())
    }
}
