//! Batched iteration over a [`UavDataset`] and the train/test loader factory.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::common_types::Batch;
use crate::config::{FitPolicy, LoaderConfig};
use crate::dataset::UavDataset;
use crate::error::{PrepError, Result};
use crate::preprocessing::LabelEncoder;

/// One pass over a dataset in a fixed order, yielding batches lazily.
#[derive(Debug)]
pub struct Batches<'a> {
    dataset: &'a UavDataset,
    order: Vec<usize>,
    batch_size: usize,
    drop_last: bool,
    position: usize,
}

impl<'a> Batches<'a> {
    fn new(dataset: &'a UavDataset, order: Vec<usize>, batch_size: usize, drop_last: bool) -> Self {
        Batches { dataset, order, batch_size, drop_last, position: 0 }
    }

    /// The sample order of this pass.
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let remaining = self.order.len() - self.position;
        if remaining == 0 || (self.drop_last && remaining < self.batch_size) {
            return None;
        }
        let end = self.position + remaining.min(self.batch_size);
        let batch = self.dataset.gather(&self.order[self.position..end]);
        self.position = end;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = batch_count(self.order.len() - self.position, self.batch_size, self.drop_last);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Batches<'_> {}

fn batch_count(samples: usize, batch_size: usize, drop_last: bool) -> usize {
    if drop_last { samples / batch_size } else { samples.div_ceil(batch_size) }
}

impl UavDataset {
    /// Starts one pass of batches of up to `batch_size` samples.
    ///
    /// With `shuffle` the order is a fresh permutation drawn from `rng`; otherwise
    /// it is file order and `rng` is untouched. Every sample appears exactly once.
    pub fn batch_iter<R: Rng + ?Sized>(&self, batch_size: usize, shuffle: bool, rng: &mut R) -> Result<Batches<'_>> {
        if batch_size == 0 {
            return Err(PrepError::Config("batch size must be greater than 0".to_string()));
        }
        let mut order: Vec<usize> = (0..self.len()).collect();
        if shuffle {
            order.shuffle(rng);
        }
        Ok(Batches::new(self, order, batch_size, false))
    }
}

/// Restartable batch source over a shared dataset.
///
/// Each call to [`DataLoader::iter`] starts a new pass; a shuffling loader draws
/// a new permutation from its own seeded RNG every time.
#[derive(Debug)]
pub struct DataLoader {
    dataset: Arc<UavDataset>,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    rng: StdRng,
}

impl DataLoader {
    pub fn new(dataset: Arc<UavDataset>, batch_size: usize, shuffle: bool, seed: Option<u64>) -> Result<Self> {
        if batch_size == 0 {
            return Err(PrepError::Config("batch size must be greater than 0".to_string()));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(DataLoader { dataset, batch_size, shuffle, drop_last: false, rng })
    }

    pub fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    pub fn dataset(&self) -> &UavDataset {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Batches per pass.
    pub fn len(&self) -> usize {
        batch_count(self.dataset.len(), self.batch_size, self.drop_last)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Starts a new pass using the loader's own RNG.
    pub fn iter(&mut self) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        Batches::new(&self.dataset, order, self.batch_size, self.drop_last)
    }

    /// Starts a new pass drawing the permutation from a caller-supplied RNG.
    pub fn iter_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Batches<'_> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            order.shuffle(rng);
        }
        Batches::new(&self.dataset, order, self.batch_size, self.drop_last)
    }
}

/// The train/test loader pair plus what a model needs to be built around it.
#[derive(Debug)]
pub struct Loaders {
    pub train: DataLoader,
    pub test: DataLoader,
    /// Feature columns after cleaning.
    pub input_dim: usize,
    pub num_classes: usize,
    /// Vocabulary for decoding predicted codes.
    pub label_encoder: LabelEncoder,
}

/// Builds the training and test loaders.
///
/// Under [`FitPolicy::FitOnTrain`] the test file is encoded and scaled with the
/// state fitted on the training file. The training loader shuffles when
/// `config.shuffle_train` is set; the test loader keeps file order.
pub fn build_loaders(train_path: impl AsRef<Path>, test_path: impl AsRef<Path>, config: &LoaderConfig) -> Result<Loaders> {
    config.validate()?;

    let train = UavDataset::fit_csv(train_path, config.feature_range)?;
    let test = match config.fit_policy {
        FitPolicy::FitOnTrain => UavDataset::from_csv_fitted(test_path, train.preprocessor())?,
        FitPolicy::Independent => {
            warn!("fitting the test file independently; label codes and feature scales may differ from training");
            UavDataset::fit_csv(test_path, config.feature_range)?
        }
    };

    let input_dim = train.feature_dim();
    let num_classes = train.num_classes();
    let label_encoder = train.label_encoder().clone();
    info!(
        "built loaders: {} train / {} test samples, input_dim={}, num_classes={}, batch_size={}",
        train.len(),
        test.len(),
        input_dim,
        num_classes,
        config.batch_size
    );

    let train = DataLoader::new(Arc::new(train), config.batch_size, config.shuffle_train, config.seed)?
        .with_drop_last(config.drop_last);
    let test = DataLoader::new(Arc::new(test), config.batch_size, false, config.seed)?.with_drop_last(config.drop_last);

    Ok(Loaders { train, test, input_dim, num_classes, label_encoder })
}
