//! User-facing cart notices.

use std::fmt::{Display, Formatter, Result as FmtResult};

use mockall::automock;
use smallvec::SmallVec;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Cart operation named in failure notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    /// Reloading the cart.
    Refresh,
    /// Adding an item.
    Add,
    /// Changing a quantity.
    UpdateQuantity,
    /// Removing an item.
    Remove,
}

impl Display for CartAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Refresh => "refresh the cart",
            Self::Add => "add the item to the cart",
            Self::UpdateQuantity => "update the quantity",
            Self::Remove => "remove the item",
        })
    }
}

/// Transient, non-blocking message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A request was clamped to the available stock.
    StockLimited {
        /// Product title.
        title: String,
        /// Units that could be added.
        available: u32,
    },

    /// A reconciliation sweep lowered quantities of these items.
    StockAdjusted {
        /// Titles of the adjusted lines.
        titles: SmallVec<[String; 4]>,
    },

    /// The server clamped a quantity on its own.
    ServerAdjusted {
        /// Message returned by the server.
        message: String,
    },

    /// The operation did not reach the server; local state was rolled back.
    ActionFailed {
        /// Operation that failed.
        action: CartAction,
    },
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::StockLimited { title, available } => {
                write!(f, "Only {available} unit(s) available for {title}")
            }
            Self::StockAdjusted { titles } => {
                write!(f, "Stock updated: quantity adjusted for: {}", titles.join(", "))
            }
            Self::ServerAdjusted { message } => f.write_str(message),
            Self::ActionFailed { action } => write!(f, "Could not {action}, please try again"),
        }
    }
}

/// Sink for notices; the rendering layer decides how to show them.
#[automock]
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::ActionFailed { .. } => warn!(%notice, "cart notice"),
            _ => info!(%notice, "cart notice"),
        }
    }
}

/// Notifier forwarding notices over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Notifier and the receiver its notices arrive on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();

        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if let Err(error) = self.tx.send(notice) {
            warn!(notice = %error.0, "notice receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    #[test]
    fn notices_render_shopper_text() {
        let limited = Notice::StockLimited {
            title: "Linen Shirt".to_string(),
            available: 5,
        };

        assert_eq!(limited.to_string(), "Only 5 unit(s) available for Linen Shirt");

        let adjusted = Notice::StockAdjusted {
            titles: smallvec!["P".to_string(), "Q".to_string()],
        };

        assert_eq!(
            adjusted.to_string(),
            "Stock updated: quantity adjusted for: P, Q"
        );
    }

    #[test]
    fn channel_notifier_forwards_in_order() {
        let (notifier, mut rx) = ChannelNotifier::channel();

        notifier.notify(Notice::ActionFailed {
            action: CartAction::Remove,
        });

        assert_eq!(
            rx.try_recv().ok(),
            Some(Notice::ActionFailed {
                action: CartAction::Remove
            })
        );
        assert!(rx.try_recv().is_err(), "only one notice was sent");
    }
}
