//! Opening fonts and looking up glyphs.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::num::NonZeroUsize;
use std::path::Path;

use raw::{
    Accelerators, BitmapTable, BoundingBox, EncodingTable, FormatError, GlyphId, GlyphMetrics,
    MetricsTable, Properties, ReadError, TableDirectory, TableKind,
};

use crate::bitmap::GlyphBitmap;
use crate::cache::{GlyphCache, GlyphSource};
use crate::glyph::Glyph;

/// Number of glyphs cached when no capacity is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Options for opening a font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontSettings {
    cache_capacity: NonZeroUsize,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            cache_capacity: NonZeroUsize::MIN.saturating_add(DEFAULT_CACHE_CAPACITY - 1),
        }
    }
}

impl FontSettings {
    /// Set the maximum number of cached glyphs. Zero is treated as one.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        self
    }

    pub fn get_cache_capacity(&self) -> usize {
        self.cache_capacity.get()
    }
}

/// A PCF font with a bounded cache of decoded glyphs.
///
/// The encoding table and font-wide metrics are read when the font is
/// opened; glyphs are decoded on first use. The font owns its byte source
/// until it is dropped or [`into_inner`](Self::into_inner) is called.
pub struct Font<R> {
    decoder: Decoder<R>,
    cache: GlyphCache,
    directory: TableDirectory,
    accelerators: Option<Accelerators>,
    properties: Option<Properties>,
    bounding_box: BoundingBox,
    ascent: i32,
    descent: i32,
}

impl Font<BufReader<File>> {
    /// Open the font at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        Self::open_with_settings(path, FontSettings::default())
    }

    pub fn open_with_settings(
        path: impl AsRef<Path>,
        settings: FontSettings,
    ) -> Result<Self, ReadError> {
        let file = File::open(path)?;
        Self::with_settings(BufReader::new(file), settings)
    }
}

impl<R: Read + Seek> Font<R> {
    pub fn new(source: R) -> Result<Self, ReadError> {
        Self::with_settings(source, FontSettings::default())
    }

    pub fn with_settings(mut source: R, settings: FontSettings) -> Result<Self, ReadError> {
        let directory = TableDirectory::read(&mut source)?;
        let encoding =
            EncodingTable::read(&mut source, directory.require(TableKind::BdfEncodings)?)?;
        let metrics = MetricsTable::read(&mut source, directory.require(TableKind::Metrics)?)?;
        let bitmaps = BitmapTable::read(&mut source, directory.require(TableKind::Bitmaps)?)?;
        if metrics.glyph_count() != bitmaps.glyph_count() {
            return Err(count_mismatch(TableKind::Bitmaps).into());
        }
        let ink_metrics = directory
            .get(TableKind::InkMetrics)
            .map(|entry| MetricsTable::read(&mut source, entry))
            .transpose()?;
        if let Some(ink) = &ink_metrics {
            if ink.glyph_count() != metrics.glyph_count() {
                return Err(count_mismatch(TableKind::InkMetrics).into());
            }
        }
        let accelerators = directory
            .get(TableKind::Accelerators)
            .or_else(|| directory.get(TableKind::BdfAccelerators))
            .map(|entry| Accelerators::read(&mut source, entry))
            .transpose()?;
        let properties = directory
            .get(TableKind::Properties)
            .map(|entry| Properties::read(&mut source, entry))
            .transpose()?;

        let (bounding_box, ascent, descent) = match &accelerators {
            Some(accel) => (accel.bounding_box(), accel.font_ascent, accel.font_descent),
            None => {
                log::debug!("no accelerator table, computing font bounds from glyph metrics");
                let bounds = metrics
                    .fold(&mut source, None, MetricsBounds::include)?
                    .unwrap_or_default();
                let property =
                    |name: &str| properties.as_ref().and_then(|props| props.integer(name));
                (
                    bounds.bounding_box(),
                    property("FONT_ASCENT").unwrap_or(bounds.ascent),
                    property("FONT_DESCENT").unwrap_or(bounds.descent),
                )
            }
        };

        log::debug!(
            "opened PCF font: {} glyphs, bounding box {bounding_box:?}, cache capacity {}",
            metrics.glyph_count(),
            settings.cache_capacity
        );
        Ok(Font {
            decoder: Decoder {
                source,
                encoding,
                metrics,
                ink_metrics,
                bitmaps,
            },
            cache: GlyphCache::new(settings.cache_capacity),
            directory,
            accelerators,
            properties,
            bounding_box,
            ascent,
            descent,
        })
    }

    /// The largest glyph extent, as width, height and the offset of its
    /// lower left corner.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Pixels above the baseline of a typical ascender.
    pub fn ascent(&self) -> i32 {
        self.ascent
    }

    /// Pixels below the baseline of a typical descender.
    pub fn descent(&self) -> i32 {
        self.descent
    }

    pub fn glyph_count(&self) -> u32 {
        self.decoder.metrics.glyph_count()
    }

    /// Map a code point to a glyph without decoding it.
    pub fn glyph_id(&self, code_point: impl Into<u32>) -> Option<GlyphId> {
        self.decoder.resolve(code_point.into())
    }

    pub fn directory(&self) -> &TableDirectory {
        &self.directory
    }

    pub fn encoding(&self) -> &EncodingTable {
        &self.decoder.encoding
    }

    pub fn accelerators(&self) -> Option<&Accelerators> {
        self.accelerators.as_ref()
    }

    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref()
    }

    /// Returns the glyph for `code_point`, decoding it if it is not cached.
    ///
    /// Returns `Ok(None)` for code points the font has no glyph for.
    pub fn glyph(&mut self, code_point: impl Into<u32>) -> Result<Option<&Glyph>, ReadError> {
        self.cache.get_or_load(code_point.into(), &mut self.decoder)
    }

    /// Returns the ink extents of the glyph for `code_point`.
    ///
    /// Returns `Ok(None)` if the font has no INK_METRICS table or no glyph
    /// for the code point. Ink metrics are not cached.
    pub fn ink_metrics(
        &mut self,
        code_point: impl Into<u32>,
    ) -> Result<Option<GlyphMetrics>, ReadError> {
        let Some(glyph_id) = self.glyph_id(code_point) else {
            return Ok(None);
        };
        let Some(ink) = &self.decoder.ink_metrics else {
            return Ok(None);
        };
        ink.get(&mut self.decoder.source, glyph_id).map(Some)
    }

    /// Decode and cache the glyphs for `code_points` in a single pass over
    /// the font.
    ///
    /// Errors for individual glyphs are logged and otherwise ignored; a
    /// later call to [`glyph`](Self::glyph) reports them.
    pub fn load_glyphs<I>(&mut self, code_points: I)
    where
        I: IntoIterator,
        I::Item: Into<u32>,
    {
        self.cache
            .load_many(code_points.into_iter().map(Into::into), &mut self.decoder);
    }

    /// Code points currently cached, most recently used first.
    pub fn cached_glyphs(&self) -> impl Iterator<Item = u32> + '_ {
        self.cache.code_points()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Release the byte source.
    pub fn into_inner(self) -> R {
        self.decoder.source
    }
}

fn count_mismatch(kind: TableKind) -> FormatError {
    FormatError::Malformed {
        kind,
        reason: "glyph count differs from the metrics table",
    }
}

/// Font-wide extents, accumulated one glyph's metrics at a time.
#[derive(Default)]
struct MetricsBounds {
    min_left: i16,
    max_right: i16,
    ascent: i32,
    descent: i32,
}

impl MetricsBounds {
    fn include(bounds: Option<Self>, glyph: GlyphMetrics) -> Option<Self> {
        let next = match bounds {
            None => Self {
                min_left: glyph.left_side_bearing,
                max_right: glyph.right_side_bearing,
                ascent: glyph.ascent as i32,
                descent: glyph.descent as i32,
            },
            Some(bounds) => Self {
                min_left: bounds.min_left.min(glyph.left_side_bearing),
                max_right: bounds.max_right.max(glyph.right_side_bearing),
                ascent: bounds.ascent.max(glyph.ascent as i32),
                descent: bounds.descent.max(glyph.descent as i32),
            },
        };
        Some(next)
    }

    fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            width: self.max_right as i32 - self.min_left as i32,
            height: self.ascent + self.descent,
            x_offset: self.min_left as i32,
            y_offset: -self.descent,
        }
    }
}

/// The per-glyph tables and the source they are read from.
struct Decoder<R> {
    source: R,
    encoding: EncodingTable,
    metrics: MetricsTable,
    ink_metrics: Option<MetricsTable>,
    bitmaps: BitmapTable,
}

impl<R: Read + Seek> Decoder<R> {
    fn assemble(
        &self,
        glyph_id: GlyphId,
        metrics: GlyphMetrics,
        packed: &[u8],
    ) -> Result<Glyph, FormatError> {
        let bitmap = GlyphBitmap::unpack(
            packed,
            &self.bitmaps.format(),
            metrics.width(),
            metrics.height(),
        )?;
        Ok(Glyph {
            glyph_id,
            metrics,
            bitmap,
        })
    }

    /// Decode `glyph_ids` with one forward pass over each table: metrics,
    /// then bitmap offsets, then bitmap data in offset order.
    fn sweep(
        &mut self,
        glyph_ids: &[GlyphId],
    ) -> Result<Vec<Result<Glyph, ReadError>>, ReadError> {
        let metrics = self.metrics.get_many(&mut self.source, glyph_ids)?;
        let offsets = self.bitmaps.offsets(&mut self.source, glyph_ids)?;

        let mut requests: Vec<(usize, u32, GlyphMetrics)> = Vec::with_capacity(glyph_ids.len());
        let mut results: Vec<Result<Glyph, ReadError>> = Vec::with_capacity(glyph_ids.len());
        for (i, (metrics, offset)) in metrics.into_iter().zip(offsets).enumerate() {
            match metrics.and_then(|metrics| offset.map(|offset| (offset, metrics))) {
                Ok((offset, metrics)) => {
                    requests.push((i, offset, metrics));
                    // replaced once the bitmap is read
                    results.push(Err(FormatError::TruncatedTable(TableKind::Bitmaps).into()));
                }
                Err(err) => results.push(Err(err.into())),
            }
        }
        requests.sort_unstable_by_key(|(_, offset, _)| *offset);

        let shapes: Vec<_> = requests
            .iter()
            .map(|(_, offset, metrics)| (*offset, metrics.width(), metrics.height()))
            .collect();
        let packed = self.bitmaps.read_many(&mut self.source, &shapes)?;
        for ((i, _, metrics), packed) in requests.into_iter().zip(packed) {
            let glyph = packed.and_then(|packed| self.assemble(glyph_ids[i], metrics, &packed));
            results[i] = glyph.map_err(ReadError::from);
        }
        Ok(results)
    }
}

impl<R: Read + Seek> GlyphSource for Decoder<R> {
    type Error = ReadError;

    fn resolve(&self, code_point: u32) -> Option<GlyphId> {
        self.encoding.resolve(code_point)
    }

    fn decode(&mut self, glyph_id: GlyphId) -> Result<Glyph, ReadError> {
        let metrics = self.metrics.get(&mut self.source, glyph_id)?;
        let packed = self.bitmaps.read_glyph(
            &mut self.source,
            glyph_id,
            metrics.width(),
            metrics.height(),
        )?;
        self.assemble(glyph_id, metrics, &packed)
            .map_err(ReadError::from)
    }

    fn decode_batch(&mut self, glyph_ids: &[GlyphId]) -> Vec<Result<Glyph, ReadError>> {
        match self.sweep(glyph_ids) {
            Ok(glyphs) => glyphs,
            Err(err) => {
                log::warn!("batch decode failed ({err}), decoding glyphs one at a time");
                glyph_ids.iter().map(|id| self.decode(*id)).collect()
            }
        }
    }
}
