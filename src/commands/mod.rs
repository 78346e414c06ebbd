/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `sessions` - list, update and delete sessions through the registry
- `auth`     - store, remove and inspect the API token

Handlers are small: they build a registry from the
configuration, call one registry operation and print the result.
*/

pub mod auth;
pub mod sessions;
