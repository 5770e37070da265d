use core::fmt;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::*;

/// Presentation commands a notifier can trigger.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    MatchMade,
}

/// Floating score text: a label and a one-shot animation.
pub trait ScorePresenter {
    fn play_cue(&mut self, cue: Cue);
    fn set_label(&mut self, text: &str);
}

pub fn points_label(points: Points) -> String {
    format!("+{}", points)
}

/// Wiring for a [`ScoreNotifier`]; the board is required.
pub struct ScoreNotifierBuilder<'a, P> {
    board: Option<&'a dyn ScoreSource>,
    presenter: P,
}

impl<'a, P: ScorePresenter + 'static> ScoreNotifierBuilder<'a, P> {
    pub fn new(presenter: P) -> Self {
        Self {
            board: None,
            presenter,
        }
    }

    pub fn board(mut self, board: &'a dyn ScoreSource) -> Self {
        self.board = Some(board);
        self
    }

    /// Subscribes to the board. Fails before touching any board when none
    /// was assigned.
    pub fn build(self) -> core::result::Result<ScoreNotifier<P>, ConfigError> {
        let Some(board) = self.board else {
            log::error!("score notifier has no board assigned");
            return Err(ConfigError::MissingCollaborator("board"));
        };

        let presenter = Rc::new(RefCell::new(self.presenter));
        let subscription = board.subscribe_points(Box::new({
            let presenter = Rc::clone(&presenter);
            move |points| match presenter.try_borrow_mut() {
                Ok(mut presenter) => present_points(&mut *presenter, points),
                Err(_) => log::warn!("score presenter busy, dropped +{} popup", points),
            }
        }));
        log::debug!("score notifier attached as {:?}", subscription.id());

        Ok(ScoreNotifier {
            presenter,
            subscription,
        })
    }
}

fn present_points(presenter: &mut impl ScorePresenter, points: Points) {
    presenter.play_cue(Cue::MatchMade);
    presenter.set_label(&points_label(points));
}

/// Observer that turns every points award into a score popup.
///
/// Dropping the notifier unsubscribes it from the board.
pub struct ScoreNotifier<P> {
    presenter: Rc<RefCell<P>>,
    subscription: Subscription,
}

impl<P: ScorePresenter + 'static> ScoreNotifier<P> {
    pub fn builder<'a>(presenter: P) -> ScoreNotifierBuilder<'a, P> {
        ScoreNotifierBuilder::new(presenter)
    }

    /// Awards arriving while the returned borrow is held are not shown.
    pub fn presenter(&self) -> Ref<'_, P> {
        self.presenter.borrow()
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_attached()
    }

    /// Stops listening and hands the presenter back.
    pub fn detach(self) -> Rc<RefCell<P>> {
        let Self {
            presenter,
            subscription,
        } = self;
        subscription.detach();
        presenter
    }
}

impl<P: fmt::Debug> fmt::Debug for ScoreNotifier<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreNotifier")
            .field("presenter", &self.presenter)
            .field("subscription", &self.subscription)
            .finish()
    }
}
