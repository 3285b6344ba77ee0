//! End-to-end flows between the C2 service, the in-process broker and
//! simulated devices.

#[cfg(test)]
mod device;

#[cfg(test)]
mod pubkey;

#[cfg(test)]
mod restart;

#[cfg(test)]
mod symmetric;
