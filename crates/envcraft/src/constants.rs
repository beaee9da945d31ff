//! Centralized constants for the envcraft workspace.
//!
//! This module contains the literal tokens shared by the env file reader,
//! the interpolation resolver, and the sample generator.

// =============================================================================
// Env File Syntax
// =============================================================================

/// Lines starting with this character are comments.
pub const COMMENT_PREFIX: char = '#';

/// Separator between a key and its value.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Optional shell-style prefix stripped from env file lines.
pub const EXPORT_PREFIX: &str = "export ";

// =============================================================================
// Interpolation
// =============================================================================

/// Introduces a reference inside a file value.
pub const REFERENCE_MARKER: char = '$';

/// Escapes a reference marker so it is kept literally.
pub const ESCAPE_CHAR: char = '\\';

/// Separator used when rendering a circular reference path.
pub const CYCLE_PATH_SEPARATOR: &str = " -> ";

// =============================================================================
// Name Resolution
// =============================================================================

/// Word separator inserted by the case-convention transform.
pub const WORD_SEPARATOR: char = '_';

// =============================================================================
// Field Builders
// =============================================================================

/// Default separator for `array()` fields.
pub const DEFAULT_ARRAY_SEPARATOR: char = ',';

/// Tokens accepted as `true` by `boolean()` fields (compared case-insensitively).
pub const TRUE_TOKENS: &[&str] = &["true", "1", "yes", "on"];

/// Tokens accepted as `false` by `boolean()` fields (compared case-insensitively).
pub const FALSE_TOKENS: &[&str] = &["false", "0", "no", "off"];

// =============================================================================
// Sample File
// =============================================================================

/// Comment emitted for fields with no default that are not optional.
pub const SAMPLE_REQUIRED: &str = "# required";

/// Comment emitted for optional fields with no default.
pub const SAMPLE_OPTIONAL: &str = "# optional";

/// Comment prefix emitted for fields with a default.
pub const SAMPLE_DEFAULT_PREFIX: &str = "# default: ";
