use core::num::Saturating;

use crate::*;

/// Anything that announces awarded points to observers.
pub trait ScoreSource {
    /// Registers `handler` for every future points award. The handler stays
    /// registered for as long as the returned [`Subscription`] lives.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    fn subscribe_points(&self, handler: Box<dyn FnMut(Points)>) -> Subscription;
}

/// Score authority for one board.
///
/// Match detection happens elsewhere; whoever resolves a match calls
/// [`Board::award_points`], which updates the running score and notifies
/// every subscriber synchronously.
#[derive(Debug, Default)]
pub struct Board {
    score: Saturating<i64>,
    awards: u32,
    points_awarded: EventBus<Points>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> i64 {
        self.score.0
    }

    pub fn awards(&self) -> u32 {
        self.awards
    }

    pub fn subscriber_count(&self) -> usize {
        self.points_awarded.subscriber_count()
    }

    /// Returns how many subscribers were notified.
    pub fn award_points(&mut self, points: Points) -> usize {
        self.score += i64::from(points);
        self.awards = self.awards.saturating_add(1);
        let notified = self.points_awarded.emit(points);
        log::debug!(
            "awarded {} points (score {}), notified {} subscribers",
            points,
            self.score.0,
            notified
        );
        notified
    }
}

impl ScoreSource for Board {
    fn subscribe_points(&self, handler: Box<dyn FnMut(Points)>) -> Subscription {
        self.points_awarded.subscribe(handler)
    }
}
