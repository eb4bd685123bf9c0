//! GL and WebGL enum values the engine interprets itself.
//!
//! Everything else is forwarded to the driver untouched, so only the values
//! the bookkeeping actually branches on live here.

// ── errors ────────────────────────────────────────────────────────────────

pub const NO_ERROR: u32 = 0;
pub const INVALID_ENUM: u32 = 0x0500;
pub const INVALID_VALUE: u32 = 0x0501;
pub const INVALID_OPERATION: u32 = 0x0502;
pub const OUT_OF_MEMORY: u32 = 0x0505;

// ── pixel formats ─────────────────────────────────────────────────────────

pub const ALPHA: u32 = 0x1906;
pub const RGB: u32 = 0x1907;
pub const RGBA: u32 = 0x1908;
pub const LUMINANCE: u32 = 0x1909;
pub const LUMINANCE_ALPHA: u32 = 0x190A;

// ── pixel types ───────────────────────────────────────────────────────────

pub const UNSIGNED_BYTE: u32 = 0x1401;
pub const UNSIGNED_SHORT_4_4_4_4: u32 = 0x8033;
pub const UNSIGNED_SHORT_5_5_5_1: u32 = 0x8034;
pub const UNSIGNED_SHORT_5_6_5: u32 = 0x8363;

// ── pixel storage ─────────────────────────────────────────────────────────

pub const UNPACK_ALIGNMENT: u32 = 0x0CF5;
pub const PACK_ALIGNMENT: u32 = 0x0D05;
pub const UNPACK_FLIP_Y_WEBGL: u32 = 0x9240;
pub const UNPACK_PREMULTIPLY_ALPHA_WEBGL: u32 = 0x9241;
pub const UNPACK_COLORSPACE_CONVERSION_WEBGL: u32 = 0x9243;
pub const BROWSER_DEFAULT_WEBGL: u32 = 0x9244;

// ── strings ───────────────────────────────────────────────────────────────

pub const VENDOR: u32 = 0x1F00;
pub const RENDERER: u32 = 0x1F01;
pub const VERSION: u32 = 0x1F02;
pub const EXTENSIONS: u32 = 0x1F03;
pub const REQUESTABLE_EXTENSIONS_ANGLE: u32 = 0x93A8;

// ── depth formats ─────────────────────────────────────────────────────────

pub const DEPTH_COMPONENT16: u32 = 0x81A5;
pub const DEPTH_COMPONENT24_OES: u32 = 0x81A6;
pub const DEPTH_COMPONENT32_OES: u32 = 0x81A7;

// ── shaders / textures ────────────────────────────────────────────────────

pub const FRAGMENT_SHADER: u32 = 0x8B30;
pub const VERTEX_SHADER: u32 = 0x8B31;
pub const TEXTURE_2D: u32 = 0x0DE1;
