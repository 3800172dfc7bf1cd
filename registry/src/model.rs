// Copyright 2021 Toolchain Labs, Inc. All rights reserved.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use serde::{Deserialize, Serialize};

/// A registered virtual host.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub host: String,
}

/// A login/password pair scoped to a [`Site`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub login: String,
    pub password: String,
    pub site: Site,
}

/// A backend TCP endpoint registered against a [`Site`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Backend {
    pub id: i64,
    pub address: String,
    pub site: Site,
}
