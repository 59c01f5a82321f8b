use crossterm::{
    cursor,
    event::{self, Event, KeyCode, MouseButton, MouseEventKind},
    execute, terminal,
};
use log::{info, warn};
use std::io::{self, stdout};
use std::time::{Duration, Instant};

mod audio;
mod game;
mod render;
mod sprite;

use game::{Game, State};
use render::PixelBuf;
use sprite::Sprite;

const SPRITE_PATH: &str = "assets/bird.png";

fn main() -> io::Result<()> {
    env_logger::init();

    let sprite = match Sprite::load(SPRITE_PATH) {
        Ok(sp) => {
            info!("loaded sprite from {SPRITE_PATH}");
            Some(sp)
        }
        Err(err) => {
            warn!("sprite unavailable ({err}), drawing a plain body");
            None
        }
    };
    let audio = audio::Audio::init();

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        event::EnableMouseCapture,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let mut buf = PixelBuf::new(cols as usize, rows as usize * 2);
    let mut game = Game::new();
    let mut rng = rand::thread_rng();

    let frame_dur = Duration::from_millis(16); // ~60 fps, the loop's native tuning

    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        cleanup(&mut out)?;
                        return Ok(());
                    }
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => {
                        jump(&mut game, audio.as_ref());
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => game.reset(),
                    _ => {}
                },
                Event::Mouse(m) => {
                    if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                        jump(&mut game, audio.as_ref());
                    }
                }
                Event::Resize(c, r) => {
                    buf.resize(c as usize, r as usize * 2);
                }
                _ => {}
            }
        }

        // Update
        let score_before = game.score;
        let was_playing = game.state == State::Playing;
        game.step(&mut rng);
        if let Some(audio) = &audio {
            if game.score > score_before {
                audio.score();
            }
            if was_playing && game.state == State::Over {
                audio.crash();
            }
        }

        // Render
        render::draw(&game, sprite.as_ref(), &mut buf, &mut rng);
        buf.present(&mut out)?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

fn jump(game: &mut Game, audio: Option<&audio::Audio>) {
    // The sound belongs to the impulse, not to arming a fresh session.
    let impulse = game.state == State::Playing;
    game.jump();
    if impulse {
        if let Some(audio) = audio {
            audio.flap();
        }
    }
}
