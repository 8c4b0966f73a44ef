//! File level decompression for the bunzip binary.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::{error, info, warn};

use crate::decompression::decompress::Decoder;
use crate::tools::cli::{BzOpts, Mode, Output};

/// Decompress every file named in opts (BzOpts), or standard in when there are none.
pub fn decompress(opts: &BzOpts) -> io::Result<()> {
    if opts.files.is_empty() {
        let stdin = io::stdin();
        let written = match opts.op_mode() {
            Mode::Test => unzip(stdin.lock(), &mut io::sink(), opts.concatenated())?,
            Mode::Unzip => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                let written = unzip(stdin.lock(), &mut out, opts.concatenated())?;
                out.flush()?;
                written
            }
        };
        info!("(stdin): {} bytes decoded.", written);
        return Ok(());
    }

    let mut failures = 0;
    for fname in &opts.files {
        if let Err(e) = decompress_file(opts, fname) {
            error!("{}: {}", fname, e);
            failures += 1;
        }
    }
    if failures > 0 {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{} of {} files failed", failures, opts.files.len()),
        ));
    }
    Ok(())
}

/// Decompress (or test) one file.
pub fn decompress_file(opts: &BzOpts, fname: &str) -> io::Result<()> {
    let source = BufReader::new(File::open(fname)?);

    match (opts.op_mode(), opts.output()) {
        (Mode::Test, _) => {
            let written = unzip(source, &mut io::sink(), opts.concatenated())?;
            info!("{}: ok ({} bytes).", fname, written);
        }
        (Mode::Unzip, Output::Stdout) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            unzip(source, &mut out, opts.concatenated())?;
            out.flush()?;
        }
        (Mode::Unzip, Output::File) => {
            let out_name = output_name(fname);
            if Path::new(&out_name).exists() && !opts.force {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("output file {} already exists", out_name),
                ));
            }
            let mut f_out = BufWriter::new(File::create(&out_name)?);
            let result = unzip(source, &mut f_out, opts.concatenated())
                .and_then(|written| f_out.flush().map(|_| written));
            match result {
                Ok(written) => info!("{}: wrote {} bytes to {}.", fname, written, out_name),
                Err(e) => {
                    // Don't leave a partial file behind.
                    drop(f_out);
                    if let Err(rm) = fs::remove_file(&out_name) {
                        warn!("Could not remove partial output {}: {}", out_name, rm);
                    }
                    return Err(e);
                }
            }
            if !opts.keep {
                fs::remove_file(fname)?;
            }
        }
    }
    Ok(())
}

/// Decode a whole source into sink. Returns the number of bytes written.
pub fn unzip<R: BufRead, W: Write>(source: R, sink: &mut W, concatenated: bool) -> io::Result<u64> {
    let mut decoder = Decoder::open(source, concatenated)?;
    let written = io::copy(&mut decoder, sink)?;
    decoder.close();
    Ok(written)
}

/// Name of the decompressed file, following bzip2's suffix rules.
pub fn output_name(fname: &str) -> String {
    const SUFFIXES: [(&str, &str); 4] = [(".bz2", ""), (".bz", ""), (".tbz2", ".tar"), (".tbz", ".tar")];
    for (suffix, replacement) in SUFFIXES {
        if let Some(stem) = fname.strip_suffix(suffix) {
            if !stem.is_empty() {
                return format!("{}{}", stem, replacement);
            }
        }
    }
    format!("{}.out", fname)
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;

    const HELLO: [u8; 41] = [
        0x42, 0x5a, 0x68, 0x39, 0x31, 0x41, 0x59, 0x26, 0x53, 0x59, 0x19, 0x31, 0x65, 0x3d, 0x00,
        0x00, 0x00, 0x81, 0x00, 0x02, 0x44, 0xa0, 0x00, 0x21, 0x9a, 0x68, 0x33, 0x4d, 0x07, 0x33,
        0x8b, 0xb9, 0x22, 0x9c, 0x28, 0x48, 0x0c, 0x98, 0xb2, 0x9e, 0x80,
    ];

    #[test]
    fn output_name_test() {
        assert_eq!(output_name("notes.txt.bz2"), "notes.txt");
        assert_eq!(output_name("notes.bz"), "notes");
        assert_eq!(output_name("backup.tbz2"), "backup.tar");
        assert_eq!(output_name("backup.tbz"), "backup.tar");
        assert_eq!(output_name("data.bin"), "data.bin.out");
        assert_eq!(output_name(".bz2"), ".bz2.out");
    }

    #[test]
    fn unzip_test() {
        let mut out = Vec::new();
        assert_eq!(unzip(HELLO.as_slice(), &mut out, true).unwrap(), 5);
        assert_eq!(out, b"hello".to_vec());
    }

    #[test]
    fn unzip_error_test() {
        let mut data = HELLO.to_vec();
        data[13] ^= 0xff;
        let err = unzip(data.as_slice(), &mut Vec::new(), true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn decompress_file_test() {
        let dir = std::env::temp_dir().join(format!("bunzip-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("hello.txt.bz2");
        let output = dir.join("hello.txt");
        fs::write(&input, HELLO).unwrap();
        let input_name = input.to_str().unwrap().to_string();

        // Keep the input the first time.
        let opts = BzOpts::parse_from(["bunzip", "-k", &input_name]);
        decompress(&opts).unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"hello".to_vec());
        assert!(input.exists());

        // Refuse to overwrite without force.
        assert!(decompress_file(&opts, &input_name).is_err());

        // Force overwrite and remove the input.
        let opts = BzOpts::parse_from(["bunzip", "-f", &input_name]);
        decompress(&opts).unwrap();
        assert_eq!(fs::read(&output).unwrap(), b"hello".to_vec());
        assert!(!input.exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
