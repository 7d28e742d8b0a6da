//! End-to-end dithering scenarios through the `Ditherer` context.

use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use tessera_dither::{DitherAlgorithm, DitherConfig, Ditherer, luminance};

fn gray(width: usize, height: usize, v: u8) -> Vec<u8> {
    [v, v, v, 255].repeat(width * height)
}

fn mean_luminance(pixels: &[u8]) -> f32 {
    let n = pixels.len() / 4;
    pixels
        .chunks_exact(4)
        .map(|p| luminance(f32::from(p[0]), f32::from(p[1]), f32::from(p[2])))
        .sum::<f32>()
        / n as f32
}

fn temp_png(name: &str, image: GrayImage) -> PathBuf {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(image)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    let path = std::env::temp_dir().join(format!("tessera-{}-{name}", std::process::id()));
    std::fs::write(&path, bytes.into_inner()).unwrap();
    path
}

#[test]
fn mid_gray_one_bit_keeps_average_luminance() {
    let mut ditherer =
        Ditherer::new(DitherConfig::new(DitherAlgorithm::FloydSteinberg).with_bits(1));
    let mut pixels = gray(2, 2, 128);
    ditherer.dither(&mut pixels, 2, 2);

    let whites = pixels.chunks_exact(4).filter(|p| p[0] == 255).count();
    assert_eq!(whites, 2);
    // Diagonal pixels match: a checkerboard.
    assert_eq!(pixels[0], pixels[12]);
    assert_eq!(pixels[4], pixels[8]);
    assert!((mean_luminance(&pixels) - 128.0).abs() <= 255.0);
}

#[test]
fn every_algorithm_tracks_mean_brightness() {
    for algorithm in DitherAlgorithm::ALL {
        let mut ditherer = Ditherer::new(DitherConfig::new(algorithm).with_bits(2));
        let mut pixels = gray(32, 32, 100);
        ditherer.dither(&mut pixels, 32, 32);
        let mean = mean_luminance(&pixels);
        assert!((mean - 100.0).abs() < 85.0, "{algorithm}: {mean}");
    }
}

#[test]
fn static_frames_are_stable_across_calls() {
    for algorithm in DitherAlgorithm::ALL {
        let mut ditherer = Ditherer::new(DitherConfig::new(algorithm).with_bits(1));
        let source: Vec<u8> = (0..16u8)
            .flat_map(|i| [i * 16, 255 - i * 16, 90, 255])
            .collect();
        let mut first = source.clone();
        let mut second = source.clone();
        ditherer.dither(&mut first, 4, 4);
        ditherer.dither(&mut second, 4, 4);
        assert_eq!(first, second, "{algorithm}");
    }
}

#[test]
fn custom_matrix_is_loaded_from_disk_once() {
    // A matrix that is all zeros thresholds everything toward white.
    let path = temp_png("zeros.png", GrayImage::from_pixel(4, 4, Luma([0])));
    let config = DitherConfig::new(DitherAlgorithm::BlueNoise)
        .with_bits(1)
        .with_matrix_path(&path);
    let mut ditherer = Ditherer::new(config);
    assert!(ditherer.preload());
    std::fs::remove_file(&path).unwrap();

    let mut pixels = gray(4, 4, 140);
    assert_eq!(ditherer.dither(&mut pixels, 4, 4), DitherAlgorithm::BlueNoise);
    assert_eq!(ditherer.matrices().len(), 1);
    // Threshold 0 is an offset near -0.5, which pulls 140 below 128.
    assert!(pixels.chunks_exact(4).all(|p| p[0] == 0));
}

#[test]
fn non_square_matrix_falls_back() {
    let path = temp_png("wide.png", GrayImage::new(8, 4));
    let config = DitherConfig::new(DitherAlgorithm::BlueNoise).with_matrix_path(&path);
    let mut ditherer = Ditherer::new(config);
    assert!(!ditherer.preload());
    let mut pixels = gray(4, 4, 60);
    assert_eq!(ditherer.dither(&mut pixels, 4, 4), DitherAlgorithm::Ordered);
    std::fs::remove_file(&path).unwrap();
    assert!(ditherer.matrices().is_empty());
}

#[test]
fn config_from_lookup_drives_the_ditherer() {
    let config = DitherConfig::from_lookup(|key| match key {
        "TESSERA_DITHER" => Some("sierra-stable".to_string()),
        "TESSERA_DITHER_BITS" => Some("1".to_string()),
        _ => None,
    });
    let mut ditherer = Ditherer::new(config);
    let mut pixels = gray(3, 3, 200);
    assert_eq!(ditherer.dither(&mut pixels, 3, 3), DitherAlgorithm::SierraStable);
    assert!(pixels.chunks_exact(4).all(|p| p[0] == 0 || p[0] == 255));
}
