// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request middleware (authentication, security headers).

pub mod auth;
pub mod security;
