use std::time::Duration;

pub const LOGGER_NAME: &str = "@entrolytics/bridge";

/// Public collector used when the configuration does not name a host.
pub const DEFAULT_HOST: &str = "https://entrolytics.click";
pub const SCRIPT_PATH: &str = "/script.js";
pub const EDGE_SCRIPT_PATH: &str = "/script-edge.js";

/// Element id of the injected `<script>`; its presence marks the tracker as loaded.
pub const SCRIPT_ELEMENT_ID: &str = "entrolytics-script";

/// Name of the object the remote script installs on `window`.
pub const GLOBAL_TRACKER_NAME: &str = "entrolytics";

pub const TRACKER_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const PAGE_VIEW_EVENT: &str = "pageview";
pub const OUTBOUND_LINK_EVENT: &str = "outbound-link-click";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const USER_ID_KEY: &str = "id";

pub const DEFAULTS_KEY: &str = "__ENTROLYTICS_CONFIG__";
