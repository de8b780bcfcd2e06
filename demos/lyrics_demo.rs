use std::time::Duration;

use ilyrics::prelude::*;

const SONG: &str = "\
[ti:Twinkle]
[00:00.50]Twinkle, twinkle, little star
[00:03.00]How I wonder what you are
[00:05.50]Up above the world so high
[00:08.00]Like a diamond in the sky
[00:10.50]
[00:15.00]Twinkle, twinkle, little star
[00:17.50]How I wonder what you are
";

/// Prints each line that finishes sliding in.
#[derive(Default)]
struct PrintPresenter {
    last: Vec<String>,
}

impl Presenter for PrintPresenter {
    fn present(&mut self, scene: &Scene, _flags: ChangeFlags) {
        let texts: Vec<String> = scene.texts().into_iter().map(String::from).collect();
        if texts != self.last {
            println!("{}", texts.join(" | "));
            self.last = texts;
        }
    }
}

fn main() {
    let lyrics = match Lyrics::parse(SONG) {
        Ok(lyrics) => lyrics,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    let overlay = OverlayConfig {
        frame_size: TransitionConfig::ease_out_quart(250),
        ..OverlayConfig::default()
    };

    let result = App::new()
        .fps(60)
        .viewport(800.0, 100.0)
        .lookahead(Duration::from_millis(350))
        .overlay(overlay)
        .run(lyrics, PrintPresenter::default());

    if let Err(e) = result {
        eprintln!("playback failed: {e}");
    }
}
