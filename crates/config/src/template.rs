//! Default configuration template with all options documented.
//!
//! Written by `logrelay init`. Every option is present so users can see what
//! is configurable without reading the source.

/// Generate the default config template.
pub fn default_config_template() -> String {
    r##"# logrelay configuration
# ======================
# Forwards log entries to Discord channels, routed by tag.
#
# Environment variable substitution is supported: ${ENV_VAR} or
# ${ENV_VAR:-fallback}. Example: token = "${DISCORD_TOKEN}"

# ══════════════════════════════════════════════════════════════════════════════
# DISCORD
# ══════════════════════════════════════════════════════════════════════════════

[discord]
token = "${DISCORD_TOKEN:-}"      # Bot token (or set LOGRELAY_DISCORD_TOKEN)
send_timeout_ms = 10000           # Max time to resolve a channel and send one message

# ══════════════════════════════════════════════════════════════════════════════
# RELAY
# ══════════════════════════════════════════════════════════════════════════════

[relay]
mode = "structured"               # plain | structured | both
min_level = "warn"                # Least severe level forwarded
tag_field = "tag"                 # Event field used as the routing tag
                                  # (events without it are tagged by level: "error", "warn", ...)
entry_name_field = "entry_name"   # Event field shown as the embed author
queue_capacity = 1024             # Entries buffered before new ones are dropped
ignore_targets = []               # Extra target prefixes never forwarded

# ══════════════════════════════════════════════════════════════════════════════
# ROUTES
# ══════════════════════════════════════════════════════════════════════════════
# Routes are checked in order. Every route whose tag equals the entry's tag
# receives it, and a route with an empty tag receives every entry in
# addition to any exact match. Channel ids are not deduplicated.
#
# [[routes]]
# tag = "error"
# channels = [123456789012345678]
#
# [[routes]]
# tag = ""                        # wildcard
# channels = [234567890123456789]
"##
    .to_string()
}
