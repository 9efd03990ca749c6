//! Ground-truth loading from Pascal VOC annotations, and image list files.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::error::{EvalError, Result};
use crate::types::{BoundingBox, GroundTruthBox};

/// Supplies the hand-labeled boxes for an image.
pub trait GroundTruthLoader: Send + Sync {
    /// Where the annotation for `image` is expected to live.
    fn annotation_path(&self, image: &Path) -> PathBuf;

    /// Parse one annotation file.
    ///
    /// # Errors
    ///
    /// `MissingFile` if the file is absent; `Parse`, `Xml` or
    /// `InvalidBoundingBox` if it is malformed.
    fn load(&self, annotation: &Path) -> Result<Vec<GroundTruthBox>>;
}

/// Annotations stored as `<image-stem>.xml` in a single directory.
#[derive(Debug, Clone)]
pub struct VocAnnotationLoader {
    dir: PathBuf,
}

impl VocAnnotationLoader {
    /// # Errors
    ///
    /// Returns `SourceUnavailable` if `dir` is not a directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(EvalError::SourceUnavailable(format!(
                "annotation directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir: dir.to_path_buf() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl GroundTruthLoader for VocAnnotationLoader {
    fn annotation_path(&self, image: &Path) -> PathBuf {
        self.dir.join(sibling_name(image, "xml"))
    }

    fn load(&self, annotation: &Path) -> Result<Vec<GroundTruthBox>> {
        load_voc_file(annotation)
    }
}

/// `<stem of image>.<extension>`; keeps dots inside the stem intact.
pub(crate) fn sibling_name(image: &Path, extension: &str) -> OsString {
    let mut name = image.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(extension);
    name
}

/// Load the ground-truth boxes of a Pascal VOC annotation file.
///
/// # Example
///
/// ```no_run
/// use pcb_eval::loader::load_voc_file;
///
/// let boxes = load_voc_file("Annotations/01_missing_hole_01.xml").unwrap();
/// println!("Loaded {} defects", boxes.len());
/// ```
pub fn load_voc_file<P: AsRef<Path>>(path: P) -> Result<Vec<GroundTruthBox>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(EvalError::MissingFile(path.to_path_buf()));
    }
    let xml = fs::read_to_string(path)?;
    parse_voc_str(&xml)
}

/// Parse a Pascal VOC annotation document.
///
/// Every `<object>` must carry a `<name>` and a `<bndbox>` with `<xmin>`,
/// `<ymin>`, `<xmax>` and `<ymax>`. Coordinates may be integers or decimals.
///
/// # Example
///
/// ```
/// use pcb_eval::loader::parse_voc_str;
///
/// let xml = r#"<annotation>
///     <object>
///         <name>short</name>
///         <bndbox><xmin>10</xmin><ymin>20</ymin><xmax>30</xmax><ymax>40</ymax></bndbox>
///     </object>
/// </annotation>"#;
/// let boxes = parse_voc_str(xml).unwrap();
/// assert_eq!(boxes[0].label, "short");
/// ```
pub fn parse_voc_str(xml: &str) -> Result<Vec<GroundTruthBox>> {
    let doc = Document::parse(xml)?;

    doc.root_element()
        .children()
        .filter(|n| n.has_tag_name("object"))
        .enumerate()
        .map(|(idx, object)| parse_object(idx, object))
        .collect()
}

fn parse_object(idx: usize, object: Node) -> Result<GroundTruthBox> {
    let label = child_text(object, "name")
        .ok_or_else(|| EvalError::Parse(format!("object {} has no <name>", idx)))?;

    let bndbox = object
        .children()
        .find(|n| n.has_tag_name("bndbox"))
        .ok_or_else(|| EvalError::Parse(format!("object {} has no <bndbox>", idx)))?;

    let coord = |tag: &str| -> Result<f64> {
        let text = child_text(bndbox, tag)
            .ok_or_else(|| EvalError::Parse(format!("object {} is missing <{}>", idx, tag)))?;
        text.parse::<f64>()
            .map_err(|e| EvalError::Parse(format!("object {} <{}> = {:?}: {}", idx, tag, text, e)))
    };

    let bbox = BoundingBox::new(coord("xmin")?, coord("ymin")?, coord("xmax")?, coord("ymax")?);
    if !bbox.is_valid() {
        return Err(EvalError::InvalidBoundingBox(format!(
            "object {} ({}) has non-positive extent: {:?}",
            idx, label, bbox
        )));
    }

    Ok(GroundTruthBox::new(label, bbox))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Read an image list: one path per line, blank lines ignored.
///
/// Relative paths are resolved against the directory of the list file.
pub fn load_image_list<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(EvalError::MissingFile(path.to_path_buf()));
    }
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let content = fs::read_to_string(path)?;
    Ok(parse_image_list(&content, base))
}

/// Parse the contents of an image list file.
pub fn parse_image_list(content: &str, base: &Path) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| base.join(line))
        .collect()
}
