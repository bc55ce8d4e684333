//! `tft-bridge memo` and `tft-bridge deposit-info`

use eyre::Result;
use tft_bridge::address_codec::{decode_memo, encode_memo};
use tft_bridge::deposit::{DepositDialog, MEMO_WARNING};

use crate::cli::{DepositInfoArgs, MemoArgs};

pub fn run(args: MemoArgs) -> Result<()> {
    if args.decode {
        let address = decode_memo(args.value.trim())?;
        println!("{}", address.to_checksum(None));
    } else {
        println!("{}", encode_memo(args.value.trim())?);
    }
    Ok(())
}

pub fn deposit_info(args: DepositInfoArgs) -> Result<()> {
    let mut dialog = DepositDialog::new(args.bridge_address, args.evm_address);

    eprintln!("WARNING: {}", MEMO_WARNING);
    if args.accept_memo_warning {
        dialog.acknowledge();
    }

    let instructions = dialog.instructions()?;
    println!("Destination: {}", instructions.destination);
    println!("Memo: {}", instructions.memo);
    println!("QR payload: {}", instructions.qr_payload);
    Ok(())
}
