use anyhow::{bail, Context as _};
use bytemuck::{Pod, Zeroable};
use glow::HasContext;
use umbra_engine::{
    consts, init_logging, ContextAttributes, EglConfig, EglDriver, LoggingConfig, Profile,
    Session, TexImage,
};

/// One 5-6-5 packed texel, as uploaded with `UNSIGNED_SHORT_5_6_5`.
#[repr(transparent)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Rgb565(u16);

impl Rgb565 {
    fn new(r: u8, g: u8, b: u8) -> Self {
        let r = u16::from(r >> 3);
        let g = u16::from(g >> 2);
        let b = u16::from(b >> 3);
        Self((r << 11) | (g << 5) | b)
    }
}

struct Args {
    width: u32,
    height: u32,
    profile: Profile,
    verbose: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut profile = Profile::WebGl1;
    let mut verbose = false;
    let mut dims = Vec::new();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--webgl2" => profile = Profile::WebGl2,
            "-v" | "--verbose" => verbose = true,
            other => dims.push(
                other
                    .parse::<u32>()
                    .with_context(|| format!("invalid dimension {other:?}"))?,
            ),
        }
    }

    let (width, height) = match dims.as_slice() {
        [] => (64, 64),
        [w, h] => (*w, *h),
        _ => bail!("usage: umbra-probe [WIDTH HEIGHT] [--webgl2] [--verbose]"),
    };
    Ok(Args {
        width,
        height,
        profile,
        verbose,
    })
}

/// A red-to-blue gradient, `width` texels wide.
fn gradient(width: u32, height: u32) -> Vec<Rgb565> {
    let width = width.max(1);
    (0..height)
        .flat_map(|_| {
            (0..width).map(move |x| {
                let t = (x * 255 / width) as u8;
                Rgb565::new(255 - t, 0, t)
            })
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    init_logging(if args.verbose {
        LoggingConfig::with_filter("umbra_engine=trace,info")
    } else {
        LoggingConfig::default()
    });

    let mut session = Session::new(EglDriver::new(EglConfig::from_env()));
    let id = session.create_context(ContextAttributes {
        profile: args.profile,
        ..ContextAttributes::sized(args.width, args.height)
    });

    let context = session.context(id).context("context vanished after creation")?;
    if let Some(message) = context.error_message() {
        bail!("context creation failed: {message}");
    }
    let (width, height) = context.size();
    let depth = context.preferred_depth_format();

    let mut current = session.activate(id).context("activating context")?;
    let gl = current.gl();
    // SAFETY: the context is current on this thread for the lifetime of `current`.
    let (vendor, renderer, version) = unsafe {
        (
            gl.get_parameter_string(consts::VENDOR),
            gl.get_parameter_string(consts::RENDERER),
            gl.get_parameter_string(consts::VERSION),
        )
    };

    println!();
    println!("  umbra-probe");
    println!("  ───────────────────────────────────────────");
    println!("  vendor     {vendor}");
    println!("  renderer   {renderer}");
    println!("  version    {version}");
    println!("  profile    {:?}", args.profile);
    println!("  surface    {width}x{height}");
    println!("  depth      {depth:#06x}");
    println!("  ───────────────────────────────────────────");
    for name in current.supported_extensions() {
        println!("  + {name}");
    }
    println!();

    let texture = current.create_texture().context("creating texture")?;
    let texels = gradient(width, height);
    let image = TexImage {
        target: consts::TEXTURE_2D,
        level: 0,
        internal_format: consts::RGB as i32,
        x_offset: 0,
        y_offset: 0,
        width,
        height,
        format: consts::RGB,
        ty: consts::UNSIGNED_SHORT_5_6_5,
    };
    current.pixel_storei(consts::UNPACK_FLIP_Y_WEBGL, 1);
    current
        .tex_image_2d(&image, Some(bytemuck::cast_slice(&texels)))
        .context("uploading gradient")?;

    let error = current.get_error();
    println!("  uploaded {width}x{height} texture {texture}, glGetError = {error:#06x}");
    drop(current);

    session.cleanup();
    log::info!("probe finished");
    Ok(())
}
