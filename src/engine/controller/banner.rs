//! ### English
//! Sticky error banner state.
//!
//! ### 中文
//! 粘滞的错误横幅状态。

use tracing::error;

use crate::engine::error::RenderErrorEvent;
use crate::engine::listeners::ErrorPresenter;

/// ### English
/// Tracks whether the banner has been revealed. Once errored, it stays errored; later events
/// only replace the text.
///
/// ### 中文
/// 记录横幅是否已显示。一旦进入 errored 状态便保持不变；后续事件只替换文本。
#[derive(Debug, Default)]
pub(crate) struct ErrorBanner {
    errored: bool,
}

impl ErrorBanner {
    pub(crate) fn is_errored(&self) -> bool {
        self.errored
    }

    pub(crate) fn show(&mut self, event: &RenderErrorEvent, presenter: &dyn ErrorPresenter) {
        let message = event.display_message();
        error!("{message}");
        presenter.set_error_message(&message);

        if !self.errored {
            self.errored = true;
            presenter.reveal_error_banner();
        }
    }
}
