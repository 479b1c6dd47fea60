//! The default service catalog installed on first run.

use rust_decimal::Decimal;

use crate::service::Service;

/// `(id, name, code, price in cents)`; every entry lasts 30 days.
const DEFAULT_SERVICES: &[(&str, &str, &str, i64)] = &[
  ("1", "Netflix 4K Ultra HD", "netflix", 3990),
  ("2", "Disney+ Premium", "disney", 3490),
  ("3", "HBO Max", "hbo", 3490),
  ("4", "YouTube Premium", "youtube", 3490),
  ("5", "Prime Video", "prime", 1490),
  ("6", "Start+", "startplus", 2990),
  ("7", "PlayPlus", "playplus", 2490),
  ("8", "Hulu", "hulu", 4490),
  ("9", "ESPN", "espn", 3990),
  ("10", "Paramount+", "paramount", 2990),
  ("11", "Deezer Premium", "deezer", 1990),
  ("12", "Canva Pro", "canva", 1490),
  ("13", "Crunchyroll", "crunchyroll", 2490),
  ("14", "ChatGPT Plus", "chatgpt", 7990),
  ("15", "Viki", "viki", 990),
  ("16", "Apple TV+", "apple", 1990),
];

pub const DEFAULT_DURATION_DAYS: u32 = 30;

pub fn default_services() -> Vec<Service> {
  DEFAULT_SERVICES
    .iter()
    .map(|&(id, name, code, cents)| Service {
      id:         id.to_owned(),
      code:       code.to_owned(),
      name:       name.to_owned(),
      price:      Decimal::new(cents, 2),
      duration:   DEFAULT_DURATION_DAYS,
      created_at: None,
    })
    .collect()
}
