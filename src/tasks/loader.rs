use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Result;
use image::RgbaImage;
use tokio::select;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::{FrameReady, LoadFrame, PreparedFrame};

// Decodes an image to RGBA8 and applies EXIF orientation if available.
// Missing metadata keeps the stored orientation.
fn decode_rgba8_apply_exif(path: &Path) -> Result<RgbaImage> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    let img = img.to_rgba8();

    let oriented = match read_orientation(path).unwrap_or(1) {
        2 => image::imageops::flip_horizontal(&img),
        3 => image::imageops::rotate180(&img),
        4 => image::imageops::flip_vertical(&img),
        // transpose: rotate90 + flip_horizontal
        5 => image::imageops::flip_horizontal(&image::imageops::rotate90(&img)),
        6 => image::imageops::rotate90(&img),
        // transverse: rotate270 + flip_horizontal
        7 => image::imageops::flip_horizontal(&image::imageops::rotate270(&img)),
        8 => image::imageops::rotate270(&img),
        _ => img,
    };
    Ok(oriented)
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let o = field.value.get_uint(0)? as u16;
    debug!("exif orientation {} for {}", o, path.display());
    Some(o)
}

/// Decode every requested frame into its slot, at most `max_in_flight` at a time.
///
/// Decodes run on the blocking pool. A finished decode fills the request's
/// slot and announces `FrameReady`; a failed one is logged and the slot stays
/// empty for good. The task ends on cancellation, or once the request channel
/// has closed and nothing is left in flight.
pub async fn run(
    mut requests: UnboundedReceiver<LoadFrame>,
    ready_tx: UnboundedSender<FrameReady>,
    cancel: CancellationToken,
    max_in_flight: usize,
) -> Result<()> {
    let max_in_flight = max_in_flight.max(1);
    let mut tasks: JoinSet<(LoadFrame, Option<RgbaImage>)> = JoinSet::new();
    let mut requests_open = true;
    let mut loaded = 0usize;
    let mut failed = 0usize;

    loop {
        if !requests_open && tasks.is_empty() {
            break;
        }
        select! {
            _ = cancel.cancelled() => {
                debug!(in_flight = tasks.len(), "loader cancelled");
                break;
            },

            maybe_req = requests.recv(), if requests_open && tasks.len() < max_in_flight => {
                match maybe_req {
                    Some(req) => {
                        tasks.spawn(async move {
                            let path = req.path.clone();
                            let res = tokio::task::spawn_blocking(move || decode_rgba8_apply_exif(&path)).await;
                            let img = match res {
                                Ok(Ok(img)) => Some(img),
                                Ok(Err(err)) => {
                                    warn!(index = req.index, path = %req.path.display(), error = %err, "frame decode failed");
                                    None
                                }
                                Err(err) => {
                                    warn!(index = req.index, error = %err, "frame decode task aborted");
                                    None
                                }
                            };
                            (req, img)
                        });
                    }
                    None => requests_open = false,
                }
            }

            Some(join_res) = tasks.join_next() => {
                let Ok((req, maybe_img)) = join_res else {
                    continue;
                };
                match maybe_img {
                    Some(rgba8) => {
                        let (width, height) = rgba8.dimensions();
                        let frame = PreparedFrame { path: req.path.clone(), width, height, pixels: rgba8.into_raw() };
                        if req.slot.fill(frame) {
                            loaded += 1;
                            debug!(index = req.index, width, height, "frame ready");
                            let _ = ready_tx.send(FrameReady(req.index));
                        }
                    }
                    None => failed += 1,
                }
            }
        }
    }

    info!(loaded, failed, "frame loader finished");
    Ok(())
}
