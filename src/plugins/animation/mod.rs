//! Frame-clip playback.
//!
//! Asset-free stand-in for a sprite-sheet animator. Actors embed an [`Animator`] in their own
//! component so state handlers can select clips and poll `frame()` / `is_finished()`; each
//! actor driver ticks it once per fixed step before dispatching `update`.

/// A named frame sequence.
#[derive(Debug, PartialEq)]
pub struct Clip {
    pub name: &'static str,
    pub frames: &'static [usize],
    pub fps: f32,
    pub looping: bool,
}

impl Clip {
    #[inline]
    fn frame_time(&self) -> f32 {
        1.0 / self.fps.max(0.0001)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Animator {
    clip: Option<&'static Clip>,
    index: usize,
    elapsed: f32,
    finished: bool,
    /// Frame shown when no clip is playing.
    still: usize,
}

impl Animator {
    /// Play `clip` unless it is already playing; a finished or different clip restarts.
    pub fn play(&mut self, clip: &'static Clip) {
        if self.is_playing(clip) {
            return;
        }
        self.restart(clip);
    }

    /// Play `clip` from its first frame.
    pub fn restart(&mut self, clip: &'static Clip) {
        self.clip = Some(clip);
        self.index = 0;
        self.elapsed = 0.0;
        self.finished = false;
    }

    /// Stop playback and hold the current frame.
    pub fn stop(&mut self) {
        self.still = self.frame();
        self.clip = None;
        self.finished = false;
    }

    /// Stop playback and show `frame`.
    pub fn set_frame(&mut self, frame: usize) {
        self.clip = None;
        self.finished = false;
        self.still = frame;
    }

    pub fn tick(&mut self, dt: f32) {
        let Some(clip) = self.clip else {
            return;
        };
        if self.finished || clip.frames.is_empty() {
            return;
        }

        self.elapsed += dt;
        let step = clip.frame_time();
        while self.elapsed >= step {
            self.elapsed -= step;
            if self.index + 1 < clip.frames.len() {
                self.index += 1;
            } else if clip.looping {
                self.index = 0;
            } else {
                self.finished = true;
                self.elapsed = 0.0;
                break;
            }
        }
    }

    /// Sheet frame currently shown.
    pub fn frame(&self) -> usize {
        match self.clip {
            Some(clip) => clip.frames.get(self.index).copied().unwrap_or(self.still),
            None => self.still,
        }
    }

    /// Position inside the current clip (0 when stopped).
    pub fn clip_index(&self) -> usize {
        if self.clip.is_some() { self.index } else { 0 }
    }

    pub fn current(&self) -> Option<&'static Clip> {
        self.clip
    }

    pub fn is_current(&self, clip: &'static Clip) -> bool {
        self.clip.is_some_and(|c| std::ptr::eq(c, clip))
    }

    pub fn is_playing(&self, clip: &'static Clip) -> bool {
        self.is_current(clip) && !self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests;
