// Business logic services layer
//
// This module contains reusable business logic that can be used across
// different parts of the application (CLI handlers, future frontends, etc.)

pub mod provenance;
