//! Differential refresh of the watchface and the info page
//!
//! The watchface is repainted once per elapsed second without clearing
//! the screen: the previous second hand and hub are erased, the overlays
//! drawn again, the hour and minute hands only moved when their endpoint
//! changed, and the hub painted last over the hand roots.

use crate::fmt::trace;
use crate::state::Screen;
use crate::traits::{
    Canvas, DisplayError, FaceData, Hand, HandSet, InfoData, InfoScreen, Ink, WatchFace,
};

/// Refresh bookkeeping for both screens
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    screen: Screen,
    /// Hand geometry currently on the panel, `None` after a full repaint
    /// is needed
    previous: Option<HandSet>,
    info_needs_redraw: bool,
    info_shown_version: Option<u32>,
    info_last_second: Option<u8>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            screen: Screen::Watchface,
            previous: None,
            info_needs_redraw: true,
            info_shown_version: None,
            info_last_second: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Hand geometry last drawn on the watchface
    pub fn previous_hands(&self) -> Option<HandSet> {
        self.previous
    }

    /// Forget what is on the panel
    ///
    /// The watchface repaints fully on its next tick, the info page
    /// redraws on its next check.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.info_needs_redraw = true;
        self.info_shown_version = None;
        self.info_last_second = None;
    }

    /// Toggle the screen and repaint
    ///
    /// The watchface is repainted immediately; the info page is drawn by
    /// the next [`RefreshScheduler::tick_info`].
    pub fn switch_screen<C: Canvas, F: WatchFace>(
        &mut self,
        canvas: &mut C,
        face: &F,
        data: &FaceData,
    ) -> Result<(), DisplayError> {
        self.screen = self.screen.toggled();
        self.invalidate();
        match self.screen {
            Screen::Watchface => self.full_repaint(canvas, face, data),
            Screen::Info => Ok(()),
        }
    }

    /// Clear and paint the whole watchface
    pub fn full_repaint<C: Canvas, F: WatchFace>(
        &mut self,
        canvas: &mut C,
        face: &F,
        data: &FaceData,
    ) -> Result<(), DisplayError> {
        self.previous = None;
        let hands = face.hands(&data.time);

        face.clear(canvas)?;
        face.draw_overlays(canvas, data)?;
        face.draw_hand(canvas, Hand::Hour, hands.hour, Ink::Draw)?;
        face.draw_hand(canvas, Hand::Minute, hands.minute, Ink::Draw)?;
        face.draw_hand(canvas, Hand::Second, hands.second, Ink::Draw)?;
        face.draw_hand(canvas, Hand::SecondTail, hands.second_tail, Ink::Draw)?;
        face.draw_hub(canvas, Ink::Draw)?;

        self.previous = Some(hands);
        Ok(())
    }

    /// Repaint the watchface for a new second
    ///
    /// Falls back to a full repaint when nothing is known about the
    /// panel. A failed draw forces a full repaint next time.
    pub fn tick_watchface<C: Canvas, F: WatchFace>(
        &mut self,
        canvas: &mut C,
        face: &F,
        data: &FaceData,
    ) -> Result<(), DisplayError> {
        let Some(previous) = self.previous.take() else {
            return self.full_repaint(canvas, face, data);
        };
        let hands = face.hands(&data.time);
        Self::paint_delta(canvas, face, data, &previous, &hands)?;
        self.previous = Some(hands);
        Ok(())
    }

    fn paint_delta<C: Canvas, F: WatchFace>(
        canvas: &mut C,
        face: &F,
        data: &FaceData,
        previous: &HandSet,
        hands: &HandSet,
    ) -> Result<(), DisplayError> {
        face.draw_hand(canvas, Hand::Second, previous.second, Ink::Erase)?;
        face.draw_hand(canvas, Hand::SecondTail, previous.second_tail, Ink::Erase)?;
        face.draw_hub(canvas, Ink::Erase)?;

        face.draw_overlays(canvas, data)?;

        for (hand, old, new) in [
            (Hand::Hour, previous.hour, hands.hour),
            (Hand::Minute, previous.minute, hands.minute),
        ] {
            if old != new {
                trace!("{:?} hand moved", hand);
                face.draw_hand(canvas, hand, old, Ink::Erase)?;
                face.draw_hand(canvas, hand, new, Ink::Draw)?;
            } else {
                // The erased second hand may have crossed it
                face.draw_hand(canvas, hand, old, Ink::Draw)?;
            }
        }

        face.draw_hand(canvas, Hand::Second, hands.second, Ink::Draw)?;
        face.draw_hand(canvas, Hand::SecondTail, hands.second_tail, Ink::Draw)?;
        face.draw_hub(canvas, Ink::Draw)
    }

    /// Whether the info page is stale for `version` and the current second
    pub fn info_due(&self, data: &InfoData<'_>, version: u32) -> bool {
        self.info_needs_redraw
            || self.info_shown_version != Some(version)
            || self.info_last_second != Some(data.now.second())
    }

    /// Redraw the info page if stale; returns whether it was drawn
    pub fn tick_info<C: Canvas, I: InfoScreen>(
        &mut self,
        canvas: &mut C,
        info: &I,
        data: &InfoData<'_>,
        version: u32,
    ) -> Result<bool, DisplayError> {
        if !self.info_due(data, version) {
            return Ok(false);
        }
        info.draw(canvas, data)?;
        self.info_needs_redraw = false;
        self.info_shown_version = Some(version);
        self.info_last_second = Some(data.now.second());
        Ok(true)
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}
