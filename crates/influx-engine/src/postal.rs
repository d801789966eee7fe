//! Mail delivery between talk phases.

use indexmap::IndexMap;
use influx_core::ActiveItemId;
use tracing::debug;

use crate::outcome::Mail;

/// Holds each agent's mailbox.
///
/// Mail delivered after a talk phase stays readable through the following
/// act phase and the next talk phase, and is replaced by the next delivery.
#[derive(Debug, Default)]
pub struct PostalService {
    boxes: IndexMap<ActiveItemId, Vec<Mail>>,
    delivered: u64,
}

impl PostalService {
    /// A service with a mailbox for each of `recipients`.
    pub fn new(recipients: impl IntoIterator<Item = ActiveItemId>) -> Self {
        Self {
            boxes: recipients.into_iter().map(|id| (id, Vec::new())).collect(),
            delivered: 0,
        }
    }

    /// Current mail of `id`.
    pub fn mailbox(&self, id: ActiveItemId) -> &[Mail] {
        self.boxes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mail delivered over the service's lifetime.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Empty every mailbox before a new delivery round.
    pub fn clear(&mut self) {
        for mailbox in self.boxes.values_mut() {
            mailbox.clear();
        }
    }

    /// Deliver one mail. Broadcasts go to every mailbox except the sender's.
    ///
    /// Returns how many mailboxes received it.
    pub fn deliver(&mut self, mail: Mail) -> usize {
        match mail.to {
            Some(to) => match self.boxes.get_mut(&to) {
                Some(mailbox) => {
                    mailbox.push(mail);
                    self.delivered += 1;
                    1
                }
                None => {
                    debug!(from = %mail.from, to = %to, "mail to unknown recipient dropped");
                    0
                }
            },
            None => {
                let mut n = 0;
                for (id, mailbox) in self.boxes.iter_mut() {
                    if *id != mail.from {
                        mailbox.push(mail.clone());
                        n += 1;
                    }
                }
                self.delivered += n as u64;
                n
            }
        }
    }
}
