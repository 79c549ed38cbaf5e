// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! `create_client` reads its settings from the environment, so this lives
//! in its own test binary and runs the cases in sequence.

use nestbox::client::create_client;
use nestbox::config::{ANON_KEY_ENV, BASE_URL_ENV};

#[test]
fn test_create_client_from_env() {
    std::env::remove_var(BASE_URL_ENV);
    std::env::set_var(ANON_KEY_ENV, "anon-key");
    assert!(create_client().is_none(), "missing URL");

    std::env::set_var(BASE_URL_ENV, "");
    assert!(create_client().is_none(), "empty URL");

    std::env::set_var(BASE_URL_ENV, "https://project.example.co/");
    std::env::remove_var(ANON_KEY_ENV);
    assert!(create_client().is_none(), "missing key");

    std::env::set_var(ANON_KEY_ENV, "anon-key");
    let client = create_client().expect("both variables set");
    assert_eq!(client.base_url(), "https://project.example.co");
    assert!(client.session_store().get().is_none());
}
