#[allow(unused)]
use crate::prelude::*;

/// Draws an `(rows, cols)` matrix from `dist` using the given random source.
#[macro_export]
macro_rules! rand_array {
    ($rng:expr, $dist:expr, $($x:expr),*) => {
        {
            use $crate::prelude::RandomExt;
            $crate::prelude::Array2::random_using(($($x,)*), $dist, $rng)
        }
    };
}

/// Declares a network topology:
///
/// ```
/// use fnn::prelude::*;
/// use fnn::network;
///
/// # fn main() -> fnn::error::Result<()> {
/// let network = network!(input_shape 2, dense 3, activation Activation::Tanh,
///                        dense 1, activation Activation::Linear)?;
/// assert_eq!(network.output_width(), 1);
/// assert!(network.needs_randomization());
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! network {
    (input_shape $i:expr, $(dense $x:expr, activation $a:expr),+ $(,)?) => {
        {
            $crate::models::Network::builder($i)
                $(.add_dense($x, $a))+
                .build()
        }
    };
}
